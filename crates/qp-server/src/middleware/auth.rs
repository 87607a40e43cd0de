//! Authentication middleware.
//!
//! The only accepted credential is `Authorization: Bearer <token>`. On success
//! the resolved [`Identity`] is inserted into request extensions so handlers
//! can extract it with `Extension<Identity>`.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use qp_core::{Error, Role};

use crate::context::AppContext;
use crate::error::AppError;
use crate::services::{self, Identity};

/// Pull the token out of an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware. Applied to protected routes only.
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| Error::Unauthenticated("missing bearer token".into()))?;

    let identity = services::accounts::authenticate(&ctx, token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        e
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Role gate for author-only routes. Must run after [`auth_middleware`].
pub async fn require_author(request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(|| Error::Unauthenticated("authentication required".into()))?;

    services::authorize(&identity, Role::Author)?;
    Ok(next.run(request).await)
}
