//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for server, auth, media, mail and rate limiting. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file, failing if it is missing or invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        match &self.auth.token_secret {
            None => warnings.push(
                "auth.token_secret is not set; a random secret will be generated and tokens will not survive a restart".into(),
            ),
            Some(s) if s.len() < 32 => {
                warnings.push("auth.token_secret is shorter than 32 characters".into());
            }
            Some(_) => {}
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            warnings.push(format!(
                "auth.bcrypt_cost {} is outside the supported range 4..=31",
                self.auth.bcrypt_cost
            ));
        }

        if self.auth.token_ttl_hours == 0 {
            warnings.push("auth.token_ttl_hours is 0; every token expires immediately".into());
        }

        if self.media.max_upload_bytes == 0 {
            warnings.push("media.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if self.mail.smtp_host.is_some() && self.mail.site_owner.is_none() {
            warnings.push("mail.smtp_host is set but mail.site_owner is missing".into());
        }

        if self.mail.smtp_username.is_some() != self.mail.smtp_password.is_some() {
            warnings.push("mail.smtp_username and mail.smtp_password must be set together".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// How long a request waits for a pooled database connection.
    pub db_connection_timeout_secs: u64,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4001,
            db_path: PathBuf::from("./data/quillpost.db"),
            db_connection_timeout_secs: 5,
            cors_origins: Vec::new(),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens.
    pub token_secret: Option<String>,
    pub token_ttl_hours: u64,
    pub bcrypt_cost: u32,
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_hours: 24 * 7,
            bcrypt_cost: 12,
            min_password_length: 8,
        }
    }
}

/// Media storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub storage_dir: PathBuf,
    /// Prefix for URLs handed out for stored media, e.g. `https://blog.example/media`.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub upload_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./data/media"),
            public_base_url: "/media".into(),
            max_upload_bytes: 5 * 1024 * 1024,
            upload_timeout_secs: 15,
        }
    }
}

/// Outgoing mail settings for the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP relay host. When unset, messages are only logged.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub use_starttls: bool,
    pub from: String,
    /// Recipient of contact-form messages.
    pub site_owner: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            use_starttls: true,
            from: "quillpost <no-reply@localhost>".into(),
            site_owner: None,
            timeout_secs: 10,
        }
    }
}

/// Per-minute request quotas for unauthenticated write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub auth_per_minute: u32,
    pub contact_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_minute: 60,
            contact_per_minute: 10,
        }
    }
}
