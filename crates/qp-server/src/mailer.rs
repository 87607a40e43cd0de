//! Outgoing mail.
//!
//! [`Mailer`] is the seam used by the contact relay. [`SmtpMailer`] talks to a
//! real relay through lettre; [`LogMailer`] only records the message in the
//! log and is used when no SMTP host is configured.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use qp_core::config::MailConfig;
use qp_core::{Error, Result};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Short name used in logs and upstream errors.
    fn name(&self) -> &'static str;

    /// Deliver one plain-text message.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Build the mailer described by `config`.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match config.smtp_host.as_deref().map(str::trim) {
        Some(host) if !host.is_empty() => Ok(Arc::new(SmtpMailer::new(host, config)?)),
        _ => {
            tracing::warn!("SMTP host not configured; contact messages will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// SMTP relay mailer.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, config: &MailConfig) -> Result<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| Error::Validation(format!("invalid mail.from address: {e}")))?;

        let builder = if config.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        }
        .map_err(|e| Error::Internal(format!("failed to configure SMTP transport: {e}")))?
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        tracing::info!(host, port = config.smtp_port, "SMTP mailer configured");

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "mail relay"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| Error::Mail(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| Error::Mail(format!("failed to build message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Mail(e.to_string()))?;

        tracing::info!(subject, "Mail sent");
        Ok(())
    }
}

/// Mailer that writes messages to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log mailer"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(to, subject, body_len = body.len(), "Mail relay in no-op mode; message not sent");
        Ok(())
    }
}
