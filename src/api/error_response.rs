//! HTTP error response handling for the API
//!
//! Converts domain errors to HTTP responses with status codes and JSON error
//! bodies, and turns handler panics into the same shape.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Implement IntoResponse for ApiError for explicit error responses
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Errors carrying a status go through Error::into_response instead
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Top-level error boundary for panicking handlers
///
/// Records the panic as an error and answers with a generic 500 body; the
/// server keeps running.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, code = "internal_error", "request handler panicked");

    ApiError::internal("Failed to process download request").into_response()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_error_into_response() {
        let response = Error::NotFound("HTTP Error 404".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "not_found");
        assert_eq!(
            api_error.error.message,
            "Content not found. The URL might be incorrect or the content is unavailable."
        );
    }

    #[tokio::test]
    async fn test_rate_limit_into_response() {
        let response = Error::RateLimited("429".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_of(response).await.error.code, "rate_limited");
    }

    #[tokio::test]
    async fn test_unavailable_tool_into_response() {
        let response = Error::ExternalTool("yt-dlp binary not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_panic_payloads_become_internal_errors() {
        for payload in [
            Box::new("static message") as Box<dyn Any + Send>,
            Box::new(String::from("owned message")),
            Box::new(42_u8),
        ] {
            let response = handle_panic(payload);
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let api_error = body_of(response).await;
            assert_eq!(api_error.error.code, "internal_error");
            assert_eq!(api_error.error.message, "Failed to process download request");
        }
    }
}
