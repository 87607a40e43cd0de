//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a test config,
//! controllable fakes for the media store and mail relay, and a full
//! [`AppContext`]. The [`TestHarness::with_server`] constructor starts Axum on
//! a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use qp_core::config::Config;
use qp_db::pool::{init_memory_pool, DbPool};
use qp_server::context::AppContext;
use qp_server::router::build_router;
pub use qp_server::testing::{FakeMedia, RecordingMailer, PNG};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// Config with a fixed secret, the minimum bcrypt cost, and a site owner.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.token_secret = Some("integration-test-secret-0123456789".into());
    config.auth.bcrypt_cost = 4;
    config.mail.site_owner = Some("owner@example.com".into());
    config.rate_limit.auth_per_minute = 1000;
    config.rate_limit.contact_per_minute = 1000;
    config
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub media: Arc<FakeMedia>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let media = FakeMedia::new();
        let mailer = RecordingMailer::new();
        let ctx = AppContext::new(db.clone(), config, media.clone(), mailer.clone())
            .expect("failed to build context");

        Self {
            ctx,
            db,
            media,
            mailer,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(test_config()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let addr = spawn(harness.ctx.clone()).await;
        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> qp_db::pool::PooledConnection {
        qp_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }
}

/// Serve `ctx` on a random local port.
pub async fn spawn(ctx: AppContext) -> SocketAddr {
    let app = build_router(ctx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind random port");
    let addr = listener.local_addr().expect("failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .ok();
    });

    addr
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub fn registration_form(email: &str, password: &str, role: &str) -> Form {
    Form::new()
        .text("email", email.to_string())
        .text("password", password.to_string())
        .text("role", role.to_string())
        .text("name", "Test Writer")
        .text("phone", "5550100")
        .text("education", "BA")
}

pub fn png_part() -> Part {
    Part::bytes(PNG.to_vec())
        .file_name("image.png")
        .mime_str("image/png")
        .expect("valid mime")
}

pub fn post_form(title: &str, category: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("category", category.to_string())
        .text("about", "A post body long enough to read.")
        .part("image", png_part())
}

/// Register an account and return `(token, account_id)`.
pub async fn register(
    client: &reqwest::Client,
    addr: SocketAddr,
    email: &str,
    role: &str,
) -> (String, String) {
    let resp = client
        .post(format!("http://{addr}/api/auth/register"))
        .multipart(registration_form(email, "secret123", role))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201, "registration of {email} failed");
    let body: Value = resp.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["account"]["id"].as_str().unwrap().to_string(),
    )
}

/// Create a post as `token` and return its JSON.
pub async fn create_post(client: &reqwest::Client, addr: SocketAddr, token: &str, title: &str) -> Value {
    let resp = client
        .post(format!("http://{addr}/api/posts"))
        .bearer_auth(token)
        .multipart(post_form(title, "Technology"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    body["post"].clone()
}
