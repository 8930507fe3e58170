use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use http::Method;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::AppError;
use crate::AppState;

/// `GET` of anything not routed elsewhere serves a file from the root;
/// every other unmatched method is refused.
pub async fn static_file(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::GET {
        return AppError::MethodNotAllowed.into_response();
    }

    let path = state.resolver.resolve(req.uri().path());
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return AppError::NotFound.into_response(),
    }

    match ServeFile::new(&path).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}
