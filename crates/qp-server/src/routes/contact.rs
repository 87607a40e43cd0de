//! Contact form endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::auth::MessageResponse;
use super::ApiJson;
use crate::context::AppContext;
use crate::error::AppError;
use crate::services::contact;

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// POST /api/contact
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message relayed", body = MessageResponse),
        (status = 400, description = "Missing field"),
        (status = 502, description = "Mail relay failed")
    )
)]
pub async fn submit(
    State(ctx): State<AppContext>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    contact::submit(&ctx, &payload.name, &payload.email, &payload.message).await?;
    Ok(Json(MessageResponse {
        message: "Message sent successfully".into(),
    }))
}
