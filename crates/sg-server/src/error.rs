//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<_, AppError>`; [`sg_core::Error`] converts into it.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: sg_core::Error,
    request_id: Option<String>,
    message: Option<String>,
}

impl AppError {
    pub fn new(inner: sg_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
            message: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Replace the client-facing message; the original error is still logged.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<sg_core::Error> for AppError {
    fn from(e: sg_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        // 416 carries no body, only the size of the resource.
        if let sg_core::Error::UnsatisfiableRange { size } = self.inner {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{size}"))],
                Body::empty(),
            )
                .into_response();
        }

        let code = match &self.inner {
            sg_core::Error::NotFound { .. } => "not_found",
            sg_core::Error::Forbidden(_) => "forbidden",
            sg_core::Error::MalformedRange(_) => "malformed_range",
            sg_core::Error::UnsatisfiableRange { .. } => "range_not_satisfiable",
            sg_core::Error::Validation(_) => "validation_error",
            sg_core::Error::Config(_) => "config_error",
            sg_core::Error::Probe(_) => "probe_error",
            sg_core::Error::Io { .. } => "io_error",
            sg_core::Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.message.unwrap_or_else(|| self.inner.to_string()),
            "code": code,
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
