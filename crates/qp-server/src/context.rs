//! Application context shared by every request handler.
//!
//! [`AppContext`] is the Axum state. It holds the DB pool, an immutable config
//! snapshot and the external collaborators behind trait objects, so tests can
//! swap in fakes for the media store and mail relay.

use std::sync::Arc;

use qp_core::config::Config;
use qp_core::Result;
use qp_db::pool::DbPool;
use qp_media::MediaStore;

use crate::mailer::Mailer;
use crate::password::PasswordHasher;
use crate::token::TokenSigner;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Bearer token issuer and verifier.
    pub tokens: Arc<TokenSigner>,
    pub passwords: Arc<PasswordHasher>,
    /// Where uploaded images are kept.
    pub media: Arc<dyn MediaStore>,
    /// Relay for contact-form mail.
    pub mailer: Arc<dyn Mailer>,
}

impl AppContext {
    /// Assemble a context. A missing `auth.token_secret` is replaced by a
    /// random one, so tokens issued by this process die with it.
    pub fn new(
        db: DbPool,
        config: Config,
        media: Arc<dyn MediaStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let secret = match config.auth.token_secret.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                tracing::warn!("No auth.token_secret configured; generated a random one for this run");
                TokenSigner::generate_secret()
            }
        };

        let tokens = Arc::new(TokenSigner::new(secret, config.auth.token_ttl_hours));
        let passwords = Arc::new(PasswordHasher::new(config.auth.bcrypt_cost)?);

        Ok(Self {
            db,
            config: Arc::new(config),
            tokens,
            passwords,
            media,
            mailer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::LogMailer;
    use qp_db::pool::init_memory_pool;
    use qp_media::LocalMediaStore;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        config
    }

    #[test]
    fn missing_secret_still_builds_working_signer() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(LocalMediaStore::new(dir.path(), "/media").unwrap());
        let ctx = AppContext::new(
            init_memory_pool().unwrap(),
            test_config(),
            media,
            Arc::new(LogMailer),
        )
        .unwrap();

        let id = qp_core::AccountId::new();
        let token = ctx.tokens.issue(id, qp_core::Role::Reader).unwrap();
        assert_eq!(ctx.tokens.verify(&token).unwrap().sub, id);
    }

    #[test]
    fn invalid_bcrypt_cost_fails() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(LocalMediaStore::new(dir.path(), "/media").unwrap());
        let mut config = test_config();
        config.auth.bcrypt_cost = 1;
        assert!(AppContext::new(init_memory_pool().unwrap(), config, media, Arc::new(LogMailer)).is_err());
    }
}
