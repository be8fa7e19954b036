use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::payments::PaymentError;
use crate::remote::RemoteError;

#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    UserAlreadyExists,
    Unauthorized,
    NotFound,
    Conflict(String),
    ValidationError(String),
    RateLimited,
    BadGateway(String),
    InternalError(String),
}

/// Convert our custom errors to HTTP responses
///
/// Every error body is `{"error": "..."}`. Internal and upstream details are
/// logged here and replaced with a generic message.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            ApiError::UserAlreadyExists => (StatusCode::CONFLICT, "User already exists"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Too many requests"),
            ApiError::Conflict(msg) => {
                return (
                    StatusCode::CONFLICT,
                    Json(serde_json::json!({
                      "error": msg
                    })),
                )
                    .into_response();
            }
            ApiError::ValidationError(msg) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                      "error": msg
                    })),
                )
                    .into_response();
            }
            ApiError::BadGateway(msg) => {
                warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Payment provider error")
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unauthorized => ApiError::Unauthorized,
            RemoteError::NotFound => ApiError::NotFound,
            RemoteError::Conflict => ApiError::Conflict("Row already exists".into()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotConfigured => {
                ApiError::InternalError("Checkout is not configured".into())
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}
