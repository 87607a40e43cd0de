//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`qp_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on service calls.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::current_request_id;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: qp_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: qp_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn code(&self) -> &'static str {
        match &self.inner {
            qp_core::Error::Validation(_) => "validation_error",
            qp_core::Error::PayloadTooLarge(_) => "payload_too_large",
            qp_core::Error::DuplicateEmail(_) => "duplicate_email",
            qp_core::Error::InvalidCredentials => "invalid_credentials",
            qp_core::Error::Unauthenticated(_) => "unauthenticated",
            qp_core::Error::Forbidden(_) => "forbidden",
            qp_core::Error::NotFound { .. } => "not_found",
            qp_core::Error::MediaUpload(_) => "media_upload_failed",
            qp_core::Error::UpstreamUnavailable { .. } => "upstream_unavailable",
            qp_core::Error::Mail(_) => "mail_failed",
            qp_core::Error::Database { .. } => "database_error",
            qp_core::Error::Io { .. } => "io_error",
            qp_core::Error::Internal(_) => "internal_error",
        }
    }
}

impl From<qp_core::Error> for AppError {
    fn from(e: qp_core::Error) -> Self {
        Self::new(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(qp_core::Error::Validation(format!(
            "invalid JSON body: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(qp_core::Error::Validation(format!(
            "expected a multipart/form-data body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(qp_core::Error::Validation(format!(
            "invalid query string: {}",
            rejection.body_text()
        )))
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

        let request_id = self.request_id.clone().or_else(current_request_id);
        let body = json!({
            "error": self.inner.to_string(),
            "code": self.code(),
            "retryable": self.inner.is_retryable(),
            "request_id": request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
