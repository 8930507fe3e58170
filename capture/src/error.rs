use axum::response::{IntoResponse, Response};
use http::StatusCode;

#[derive(Debug)]
pub enum AppError {
    InvalidFrameName(String),
    MissingFile,
    BadRequest(String),
    InsufficientFrames { got: usize, expected: u64 },
    SubprocessFailure { code: Option<i32>, message: String },
    NotFound,
    MethodNotAllowed,
    InternalServerError(anyhow::Error),
}

impl AppError {
    pub fn invalid_frame_name<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::InvalidFrameName(t.to_string())
    }

    pub fn bad_request<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::BadRequest(t.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidFrameName(_)
            | AppError::MissingFile
            | AppError::BadRequest(_)
            | AppError::InsufficientFrames { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::SubprocessFailure { .. } | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InvalidFrameName(name) => format!("bad filename: {name}"),
            AppError::MissingFile => "missing file".to_string(),
            AppError::BadRequest(err) => err.clone(),
            AppError::InsufficientFrames { got, expected } => {
                format!("not enough frames: got {got}, expected {expected}")
            }
            AppError::SubprocessFailure { message, .. } => message.clone(),
            AppError::NotFound => "not found".to_string(),
            AppError::MethodNotAllowed => "method not allowed".to_string(),
            AppError::InternalServerError(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::InternalServerError(err.into())
    }
}
