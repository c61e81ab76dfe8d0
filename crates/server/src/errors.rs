use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Failures that happen in the server before a request reaches the `DocumentHandler`.
pub enum AppError {
    /// The request body could not be read as UTF-8 text.
    InvalidBody(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::InvalidBody(msg) => {
                error!("Invalid request body: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, [("Access-Control-Allow-Origin", "*")], body).into_response()
    }
}
