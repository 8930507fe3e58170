use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::Router;

use crate::error::AppError;
use crate::frame::FrameName;
use crate::result::Result;
use crate::route::fallback;
use crate::AppState;

pub fn route() -> Router<AppState> {
    Router::new().route(
        api::path::FRAME,
        post(upload).fallback(fallback::static_file),
    )
}

async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<&'static str> {
    let mut multipart = multipart.map_err(|e| AppError::bad_request(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() != Some(api::path::FRAME_FIELD) {
            continue;
        }
        let name = match field.file_name() {
            Some(name) => FrameName::parse(name)?,
            None => return Err(AppError::MissingFile),
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        state.store.store_frame(name.as_str(), &bytes).await?;
        return Ok("ok");
    }

    Err(AppError::MissingFile)
}
