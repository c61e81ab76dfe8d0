//! # Route Handlers
//!
//! The document endpoints are served by a single fallback handler that turns the
//! HTTP request into an `ApiRequest` and lets the `DocumentHandler` route it.

use crate::{errors::AppError, state::AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use doctag::{ApiRequest, ApiResponse};
use tracing::warn;

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "doctag server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Forwards any other request to the `DocumentHandler`.
pub async fn document_handler(
    State(app_state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, AppError> {
    let body = if body.is_empty() {
        None
    } else {
        Some(
            String::from_utf8(body.to_vec())
                .map_err(|e| AppError::InvalidBody(format!("Request body is not UTF-8: {e}")))?,
        )
    };

    let request = ApiRequest::new(method.as_str(), uri.path(), body);
    let response = app_state.document_handler.dispatch(&request).await;
    Ok(into_http_response(response))
}

/// Renders an `ApiResponse` as an axum response.
pub fn into_http_response(response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(%name, "Dropping response header that is not valid HTTP."),
        }
    }

    (status, headers, response.body).into_response()
}
