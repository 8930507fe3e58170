use api::request::EncodeRequest;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::Router;
use tracing::debug;

use crate::error::AppError;
use crate::result::Result;
use crate::route::fallback;
use crate::AppState;

pub fn route() -> Router<AppState> {
    Router::new().route(
        api::path::ENCODE,
        post(encode).fallback(fallback::static_file),
    )
}

async fn encode(State(state): State<AppState>, body: Bytes) -> Result<String> {
    let req = if state.config.encoder.strict_json {
        EncodeRequest::strict(&body)
            .map_err(|e| AppError::bad_request(format!("invalid encode body: {e}")))?
    } else {
        EncodeRequest::lenient(&body)
    };
    debug!("encode request: {:?}", req);

    // Detached so that a client hanging up does not abort the encoder.
    let (store, encoder) = (state.store.clone(), state.encoder.clone());
    let encoded = tokio::spawn(async move { encoder.encode(&store, &req).await }).await??;

    Ok(encoded.summary())
}
