//! Authentication route handlers: register, login, logout.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiJson, FormData};
use crate::context::AppContext;
use crate::error::AppError;
use crate::services::accounts::{self, AccountView, Registration, Session};

/// Login request payload. Missing fields deserialize as empty and are
/// rejected by validation.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// `reader` or `author`.
    pub role: String,
}

/// Register/login response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub account: AccountView,
}

impl AuthResponse {
    fn new(message: &str, session: Session) -> Self {
        Self {
            message: message.into(),
            token: session.token,
            account: session.account,
        }
    }
}

/// Multipart body of a registration, for the API document.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct RegisterForm {
    email: String,
    password: String,
    /// `reader` or `author`.
    role: String,
    name: String,
    phone: String,
    education: String,
    #[schema(value_type = Option<String>, format = Binary)]
    photo: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/auth/register
///
/// Multipart fields: `email`, `password`, `role`, `name`, `phone`,
/// `education`, and an optional `photo` file.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid field"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut form = FormData::read(multipart?, &["photo"], ctx.config.media.max_upload_bytes).await?;
    let input = Registration {
        email: form.text_or_empty("email"),
        password: form.text_or_empty("password"),
        role: form.text_or_empty("role"),
        name: form.text_or_empty("name"),
        phone: form.text_or_empty("phone"),
        education: form.text_or_empty("education"),
        photo: form.take_file("photo"),
    };

    let session = accounts::register(&ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("User registered successfully", session)),
    ))
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing field"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(ctx): State<AppContext>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = accounts::login(&ctx, &payload.email, &payload.password, &payload.role).await?;
    Ok(Json(AuthResponse::new("User logged in successfully", session)))
}

/// POST /api/auth/logout
///
/// Tokens are not tracked server-side; the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "User logged out successfully".into(),
    })
}
