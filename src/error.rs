use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::event::ApiResponse;

/// Failure taxonomy shared by all handlers. Validation problems become 400s
/// with a message; database failures are logged and collapsed into an opaque
/// 500 so infrastructure detail never leaks to the caller.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => ApiResponse::json(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"error": message}),
            )
            .into_response(),
            AppError::Database(e) => {
                tracing::error!("Database failure: {}", e);
                ApiResponse::json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &serde_json::json!({"error": "Internal server error"}),
                )
                .into_response()
            }
        }
    }
}
