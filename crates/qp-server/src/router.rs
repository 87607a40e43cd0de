//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and media file serving.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::auth::{auth_middleware, require_author};
use crate::middleware::rate_limit::{create_limiter, rate_limit_middleware};
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::auth::register,
        routes::auth::login,
        routes::auth::logout,
        routes::users::me,
        routes::users::authors,
        routes::posts::list_posts,
        routes::posts::get_post,
        routes::posts::my_posts,
        routes::posts::create_post,
        routes::posts::update_post,
        routes::posts::delete_post,
        routes::contact::submit,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::auth::LoginRequest,
        routes::auth::RegisterForm,
        routes::auth::AuthResponse,
        routes::auth::MessageResponse,
        routes::posts::PostForm,
        routes::posts::PostResponse,
        routes::posts::DeleteResponse,
        routes::contact::ContactRequest,
        crate::services::accounts::AccountView,
        crate::services::posts::PostView,
        qp_core::Role,
        qp_core::Category,
    ))
)]
pub struct ApiDoc;

/// Multipart overhead allowed on top of the largest accepted image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let config = ctx.config.clone();
    let cors = cors_layer(&config.server.cors_origins);

    // Credential endpoints share one limiter.
    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route_layer(middleware::from_fn(rate_limit_middleware))
        .route_layer(Extension(create_limiter(config.rate_limit.auth_per_minute)))
        .route("/auth/logout", post(routes::auth::logout));

    let contact_routes = Router::new()
        .route("/contact", post(routes::contact::submit))
        .route_layer(middleware::from_fn(rate_limit_middleware))
        .route_layer(Extension(create_limiter(config.rate_limit.contact_per_minute)));

    let public_routes = Router::new()
        .route("/users/authors", get(routes::users::authors))
        .route("/posts", get(routes::posts::list_posts))
        .route("/posts/{id}", get(routes::posts::get_post));

    // Role gate runs inside authentication, before any body is read.
    let author_routes = Router::new()
        .route("/posts", post(routes::posts::create_post))
        .route("/posts/mine", get(routes::posts::my_posts))
        .route(
            "/posts/{id}",
            put(routes::posts::update_post).delete(routes::posts::delete_post),
        )
        .route_layer(middleware::from_fn(require_author));

    let signed_in_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .merge(author_routes)
        .route_layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    let api = auth_routes
        .merge(contact_routes)
        .merge(public_routes)
        .merge(signed_in_routes)
        .layer(DefaultBodyLimit::max(
            config.media.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        ));

    let media_dir = &config.media.storage_dir;
    tracing::info!("Serving media files from {}", media_dir.display());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", api)
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
