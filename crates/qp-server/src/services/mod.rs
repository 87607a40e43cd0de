//! Business operations behind the HTTP handlers.
//!
//! Handlers parse the wire format and hand typed input to these functions;
//! every rule about credentials, roles, ownership and media lifetimes lives
//! here.

pub mod accounts;
pub mod contact;
pub mod posts;

#[cfg(test)]
pub(crate) mod test_support;

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use bytes::Bytes;
use qp_core::{AccountId, Error, MediaRef, Result, Role};
use regex::Regex;

use crate::context::AppContext;

/// The authenticated caller, resolved from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub role: Role,
}

/// Fail with `Forbidden` unless `identity` holds `required`.
pub fn authorize(identity: &Identity, required: Role) -> Result<()> {
    if identity.role == required {
        Ok(())
    } else {
        Err(Error::Forbidden(format!("{required} role required")))
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid")
});

pub(crate) fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_RE.is_match(email)
}

/// Trim `value` and fail if nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Await `fut`, failing with `UpstreamUnavailable` after `secs` seconds.
pub(crate) async fn with_timeout<T>(
    service: &str,
    secs: u64,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::upstream(service, format!("no response within {secs}s"))),
    }
}

/// Validate an uploaded image and store it.
pub(crate) async fn upload_image(ctx: &AppContext, data: Bytes) -> Result<MediaRef> {
    let kind = qp_media::detect_image(&data, ctx.config.media.max_upload_bytes)?;
    with_timeout(
        ctx.media.name(),
        ctx.config.media.upload_timeout_secs,
        ctx.media.upload(data, kind),
    )
    .await
}

/// Release stored media. Callers decide whether a failure matters.
pub(crate) async fn release_media(ctx: &AppContext, media: &MediaRef) -> Result<()> {
    with_timeout(
        ctx.media.name(),
        ctx.config.media.upload_timeout_secs,
        ctx.media.delete(&media.delete_id),
    )
    .await
}

/// Release media whose owning record never came into being.
pub(crate) async fn discard_upload(ctx: &AppContext, media: &MediaRef) {
    if let Err(e) = release_media(ctx, media).await {
        tracing::warn!(delete_id = %media.delete_id, error = %e, "Failed to release orphaned upload");
    }
}
