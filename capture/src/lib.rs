use std::future::{Future, IntoFuture};

use axum::extract::{DefaultBodyLimit, Request};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Level};

use crate::config::Config;
use crate::route::fallback;

pub use crate::bind::bind;
pub use crate::route::AppState;

pub mod bind;
pub mod config;
pub mod encode;
pub mod error;
pub mod frame;
pub mod resolver;
pub mod result;
pub mod route;
pub mod store;

/// Prepares the frames directory and serves until `signal` resolves.
/// Open connections are not waited for, so a running encode is abandoned.
pub async fn serve<F>(cfg: Config, listener: TcpListener, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    cfg.validate()?;
    let app_state = AppState::new(cfg);
    app_state.store.ensure_working_directory().await?;

    info!(
        "Server listening on http://{}, frames in {}",
        listener.local_addr()?,
        app_state.store.dir().display()
    );
    let server = axum::serve(listener, app(app_state)).into_future();
    tokio::select! {
        res = server => res?,
        _ = signal => info!("Shutdown signal received, stop serving"),
    }
    Ok(())
}

pub fn app(app_state: AppState) -> Router {
    let http = app_state.config.http.clone();
    Router::new()
        .merge(route::frame::route())
        .merge(route::encode::route())
        .fallback(fallback::static_file)
        .layer(DefaultBodyLimit::max(http.body_limit))
        .layer(if http.cors {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "http_request",
                        uri = ?request.uri(),
                        method = ?request.method(),
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO))
                .on_failure(tower_http::trace::DefaultOnFailure::new().level(Level::INFO)),
        )
        .with_state(app_state)
}
