//! Contact-form relay to the site owner.

use qp_core::{Error, Result};

use super::{required_text, with_timeout};
use crate::context::AppContext;

/// Relay a visitor's message to `mail.site_owner`. Not retried on failure.
pub async fn submit(ctx: &AppContext, name: &str, email: &str, message: &str) -> Result<()> {
    let name = required_text("name", name)?;
    let email = required_text("email", email)?;
    let message = required_text("message", message)?;

    let owner = ctx
        .config
        .mail
        .site_owner
        .as_deref()
        .ok_or_else(|| Error::Mail("no site owner address configured".into()))?;

    let subject = format!("New message from {name}");
    let body = format!("Email {email}\n\nMessage : {message}");

    with_timeout(
        ctx.mailer.name(),
        ctx.config.mail.timeout_secs,
        ctx.mailer.send(owner, &subject, &body),
    )
    .await?;

    tracing::info!("Contact message relayed");
    Ok(())
}
