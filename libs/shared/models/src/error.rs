use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Transport-level failures. Expected business failures (bad input, slot
/// taken, not found, ...) are not errors at this layer: handlers render
/// them as `{success: false, message}` with a 200 status, per the API
/// contract. `AppError` covers what is left: authentication, and
/// unexpected failures whose detail must stay out of the response body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Internal(msg)
            | AppError::Database(msg)
            | AppError::ExternalService(msg) => {
                // Logged in full, surfaced sanitized.
                tracing::error!("Unexpected failure: {}", msg);
                (StatusCode::OK, "Something went wrong".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message
        }));

        (status, body).into_response()
    }
}
