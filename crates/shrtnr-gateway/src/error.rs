use crate::model::ErrorResponse;
use crate::verify::VerifyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shrtnr_core::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("url is empty")]
    EmptyUrl,
    #[error("url is not valid: {0}")]
    InvalidUrl(#[from] VerifyError),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Shortener(ShortenerError),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        match value {
            ShortenerError::Storage(shrtnr_core::StorageError::NotFound(code)) => {
                Self::NotFound(code)
            }
            other => Self::Shortener(other),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyUrl => StatusCode::BAD_REQUEST,
            AppError::InvalidUrl(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Shortener(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
