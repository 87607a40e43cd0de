//! Registration, login and token authentication.

use bytes::Bytes;
use qp_core::{AccountId, Error, Result, Role};
use qp_db::models::{Account, NewAccount};
use qp_db::pool::get_conn;
use qp_db::queries::accounts;
use serde::Serialize;

use super::{discard_upload, is_valid_email, required_text, upload_image, Identity};
use crate::context::AppContext;

/// Account projection returned over HTTP. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct AccountView {
    #[schema(value_type = String)]
    pub id: AccountId,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub phone: String,
    pub education: String,
    /// Public URL of the profile photo.
    pub photo: Option<String>,
    pub created_at: String,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            role: a.role,
            name: a.name,
            phone: a.phone,
            education: a.education,
            photo: a.photo.map(|p| p.url),
            created_at: a.created_at,
        }
    }
}

/// Registration input, as parsed from the multipart form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub phone: String,
    pub education: String,
    pub photo: Option<Bytes>,
}

/// A freshly authenticated account and its bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: AccountView,
    pub token: String,
}

/// Create an account and log it in.
///
/// The photo, if any, is uploaded only after every field has validated and the
/// email is known to be free. If the insert then fails the upload is released.
pub async fn register(ctx: &AppContext, input: Registration) -> Result<Session> {
    let email = normalize_email(&input.email)?;
    if !is_valid_email(&email) {
        return Err(Error::Validation(format!("'{email}' is not a valid email address")));
    }
    let min_len = ctx.config.auth.min_password_length;
    if input.password.chars().count() < min_len {
        return Err(Error::Validation(format!(
            "password must be at least {min_len} characters"
        )));
    }
    let role: Role = required_text("role", &input.role)?.parse()?;
    let name = required_text("name", &input.name)?;
    let phone = required_text("phone", &input.phone)?;
    let education = required_text("education", &input.education)?;
    if let Some(photo) = &input.photo {
        qp_media::detect_image(photo, ctx.config.media.max_upload_bytes)?;
    }

    {
        let conn = get_conn(&ctx.db)?;
        if accounts::email_exists(&conn, &email)? {
            return Err(Error::DuplicateEmail(email));
        }
    }

    let password_hash = hash_password(ctx, input.password).await?;

    let photo = match input.photo {
        Some(data) => Some(upload_image(ctx, data).await?),
        None => None,
    };

    let inserted = get_conn(&ctx.db).and_then(|conn| {
        accounts::create_account(
            &conn,
            &NewAccount {
                email: &email,
                password_hash: &password_hash,
                role,
                name: &name,
                phone: &phone,
                education: &education,
                photo: photo.as_ref(),
            },
        )
    });

    let account = match inserted {
        Ok(account) => account,
        Err(e) => {
            if let Some(photo) = &photo {
                discard_upload(ctx, photo).await;
            }
            return Err(e);
        }
    };

    tracing::info!(account_id = %account.id, role = %account.role, "Account registered");

    let token = ctx.tokens.issue(account.id, account.role)?;
    Ok(Session {
        account: account.into(),
        token,
    })
}

/// Check credentials and issue a token.
///
/// Unknown email, wrong password and a role other than the account's all
/// fail with the same [`Error::InvalidCredentials`].
pub async fn login(ctx: &AppContext, email: &str, password: &str, role: &str) -> Result<Session> {
    let email = normalize_email(email)?;
    if password.is_empty() {
        return Err(Error::Validation("password is required".into()));
    }
    let role: Role = required_text("role", role)?.parse()?;

    let account = {
        let conn = get_conn(&ctx.db)?;
        accounts::get_account_by_email(&conn, &email)?
    };

    let hasher = ctx.passwords.clone();
    let password = password.to_string();
    let stored_hash = account.as_ref().map(|a| a.password_hash.clone());
    let password_ok = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => {
            hasher.verify_dummy(&password);
            false
        }
    })
    .await
    .map_err(|e| Error::Internal(format!("password check task failed: {e}")))?;

    let account = match account {
        Some(a) if password_ok && a.role == role => a,
        _ => {
            tracing::debug!("Login rejected");
            return Err(Error::InvalidCredentials);
        }
    };

    let token = ctx.tokens.issue(account.id, account.role)?;
    tracing::info!(account_id = %account.id, "Login successful");
    Ok(Session {
        account: account.into(),
        token,
    })
}

/// Resolve a bearer token to the caller's identity.
///
/// Besides signature and expiry, the account must still exist and still hold
/// the role named in the token.
pub fn authenticate(ctx: &AppContext, token: &str) -> Result<Identity> {
    let claims = ctx.tokens.verify(token)?;
    let conn = get_conn(&ctx.db)?;
    match accounts::get_account_by_id(&conn, claims.sub)? {
        Some(account) if account.role == claims.role => Ok(Identity {
            account_id: account.id,
            role: account.role,
        }),
        Some(_) => Err(Error::Unauthenticated("token role no longer matches account".into())),
        None => Err(Error::Unauthenticated("account no longer exists".into())),
    }
}

/// The caller's own account.
pub fn profile(ctx: &AppContext, identity: &Identity) -> Result<AccountView> {
    let conn = get_conn(&ctx.db)?;
    accounts::get_account_by_id(&conn, identity.account_id)?
        .map(AccountView::from)
        .ok_or_else(|| Error::not_found("account", identity.account_id))
}

/// Every author account, oldest first.
pub fn list_authors(ctx: &AppContext) -> Result<Vec<AccountView>> {
    let conn = get_conn(&ctx.db)?;
    Ok(accounts::list_accounts_by_role(&conn, Role::Author)?
        .into_iter()
        .map(AccountView::from)
        .collect())
}

fn normalize_email(email: &str) -> Result<String> {
    Ok(required_text("email", email)?.to_lowercase())
}

async fn hash_password(ctx: &AppContext, password: String) -> Result<String> {
    let hasher = ctx.passwords.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| Error::Internal(format!("password hashing task failed: {e}")))?
}
