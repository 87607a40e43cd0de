//! Unified error type for quillpost.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Message shared by every failed login, whatever the underlying cause.
pub const INVALID_CREDENTIALS: &str = "Invalid email, password or role";

/// Unified error type covering all failure modes in quillpost.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An upload or request body is over the configured size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An account with this email is already registered.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Login failed. Unknown email, wrong password and wrong role all map here.
    #[error("{INVALID_CREDENTIALS}")]
    InvalidCredentials,

    /// The caller presented no token, or one that failed verification.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is authenticated but lacks the role or ownership required.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "post", "account").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The media store rejected or failed an upload.
    #[error("Media upload failed: {0}")]
    MediaUpload(String),

    /// A dependency did not answer within its timeout.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        /// Name of the dependency ("media store", "mail relay").
        service: String,
        /// Human-readable error description.
        message: String,
    },

    /// The mail relay refused or failed to deliver a message.
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::PayloadTooLarge(_) => 413,
            Error::DuplicateEmail(_) => 409,
            Error::InvalidCredentials => 401,
            Error::Unauthenticated(_) => 401,
            Error::Forbidden(_) => 403,
            Error::NotFound { .. } => 404,
            Error::MediaUpload(_) => 502,
            Error::UpstreamUnavailable { .. } => 503,
            Error::Mail(_) => 502,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Whether the caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::MediaUpload(_) | Error::UpstreamUnavailable { .. } | Error::Mail(_)
        )
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::UpstreamUnavailable`].
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("post", "abc-123");
        assert_eq!(err.to_string(), "post not found: abc-123");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn invalid_credentials_is_opaque() {
        let err = Error::InvalidCredentials;
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn unauthenticated_display() {
        let err = Error::Unauthenticated("token expired".into());
        assert_eq!(err.to_string(), "Unauthenticated: token expired");
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn forbidden_display() {
        let err = Error::Forbidden("author role required".into());
        assert_eq!(err.to_string(), "Forbidden: author role required");
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let err = Error::DuplicateEmail("a@x.com".into());
        assert_eq!(err.to_string(), "Email 'a@x.com' is already registered");
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("title is required".into());
        assert_eq!(err.to_string(), "Validation error: title is required");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn upstream_display_and_retry() {
        let err = Error::upstream("media store", "timed out after 10s");
        assert_eq!(
            err.to_string(),
            "media store unavailable: timed out after 10s"
        );
        assert_eq!(err.http_status(), 503);
        assert!(err.is_retryable());
    }

    #[test]
    fn dependency_failures_are_retryable() {
        assert!(Error::MediaUpload("bad gateway".into()).is_retryable());
        assert!(Error::Mail("rejected".into()).is_retryable());
        assert!(!Error::Validation("x".into()).is_retryable());
        assert!(!Error::InvalidCredentials.is_retryable());
    }

    #[test]
    fn database_display() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }
}
