//! Fixtures shared by the service unit tests.

use std::sync::Arc;

use qp_core::config::Config;
use qp_core::Role;
use qp_db::models::NewAccount;
use qp_db::pool::init_memory_pool;
use qp_media::{LocalMediaStore, MediaStore};
use tempfile::TempDir;

use super::Identity;
use crate::context::AppContext;
use crate::mailer::Mailer;
pub use crate::testing::{FakeMedia, RecordingMailer, PNG};

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.auth.token_secret = Some("unit-test-secret-unit-test-secret".into());
    config.mail.site_owner = Some("owner@example.com".into());
    config
}

/// Context backed by an in-memory DB and a local store in a temp dir.
pub fn context() -> (AppContext, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let media = Arc::new(LocalMediaStore::new(dir.path(), "/media").unwrap());
    let ctx = AppContext::new(
        init_memory_pool().unwrap(),
        test_config(),
        media,
        RecordingMailer::new(),
    )
    .unwrap();
    (ctx, dir)
}

pub fn context_with_media(media: Arc<dyn MediaStore>) -> (AppContext, TempDir) {
    let (ctx, dir) = context();
    (AppContext { media, ..ctx }, dir)
}

pub fn context_with_mailer(mailer: Arc<dyn Mailer>) -> (AppContext, TempDir) {
    let (ctx, dir) = context();
    (AppContext { mailer, ..ctx }, dir)
}

/// Insert an author account directly and return its identity.
pub fn author(ctx: &AppContext, email: &str) -> Identity {
    let conn = ctx.db.get().unwrap();
    let account = qp_db::queries::accounts::create_account(
        &conn,
        &NewAccount {
            email,
            password_hash: "unused",
            role: Role::Author,
            name: "Writer",
            phone: "5550100",
            education: "BA",
            photo: None,
        },
    )
    .unwrap();
    Identity {
        account_id: account.id,
        role: account.role,
    }
}
