//! Account read endpoints.

use axum::extract::State;
use axum::{Extension, Json};

use crate::context::AppContext;
use crate::error::AppError;
use crate::services::accounts::{self, AccountView};
use crate::services::Identity;

/// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The caller's account", body = AccountView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(accounts::profile(&ctx, &identity)?))
}

/// GET /api/users/authors
#[utoipa::path(
    get,
    path = "/api/users/authors",
    responses(
        (status = 200, description = "All author accounts", body = Vec<AccountView>)
    )
)]
pub async fn authors(State(ctx): State<AppContext>) -> Result<Json<Vec<AccountView>>, AppError> {
    Ok(Json(accounts::list_authors(&ctx)?))
}
