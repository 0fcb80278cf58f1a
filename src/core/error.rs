use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::constants::GENERIC_UPLOAD_ERROR;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String, retry_after: i64 },

    #[error("Server configuration error: {0}")]
    ServerMisconfigured(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServerMisconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ExternalServiceError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::MethodNotAllowed => ErrorResponse::new("Method not allowed"),
            AppError::RateLimitExceeded {
                message,
                retry_after,
            } => ErrorResponse::rate_limited(message, retry_after),
            AppError::ServerMisconfigured(ref detail) => {
                tracing::error!("Server configuration error: {}", detail);
                ErrorResponse::new("Server configuration error")
            }
            AppError::PayloadTooLarge(msg) => ErrorResponse::new(msg),
            AppError::BadRequest(msg) => ErrorResponse::new(msg),
            AppError::Forbidden(msg) => ErrorResponse::new(msg),
            AppError::ExternalServiceError(ref msg) => {
                tracing::error!("External service error: {}", msg);
                ErrorResponse::new(GENERIC_UPLOAD_ERROR)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::new(GENERIC_UPLOAD_ERROR)
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
