//! Post route handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::{parse_post_id, FormData};
use crate::context::AppContext;
use crate::error::AppError;
use crate::services::posts::{self, NewPost, PostUpdate, PostView};
use crate::services::Identity;

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListPostsQuery {
    /// Restrict to one category (case-insensitive).
    pub category: Option<String>,
}

/// Post mutation response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub message: String,
    pub post: PostView,
}

/// Delete response. `warnings` lists cleanup that failed after the post was
/// removed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub warnings: Vec<String>,
}

/// Multipart body of a post create or update, for the API document.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct PostForm {
    title: Option<String>,
    category: Option<String>,
    about: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

const POST_FILE_FIELDS: &[&str] = &["image"];

/// GET /api/posts
#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts, newest first", body = Vec<PostView>),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn list_posts(
    State(ctx): State<AppContext>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<Json<Vec<PostView>>, AppError> {
    let Query(query) = query?;
    Ok(Json(posts::list(&ctx, query.category.as_deref())?))
}

/// GET /api/posts/{id}
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = PostView),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_post(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<PostView>, AppError> {
    let id = parse_post_id(&id)?;
    Ok(Json(posts::get(&ctx, id)?))
}

/// GET /api/posts/mine
#[utoipa::path(
    get,
    path = "/api/posts/mine",
    responses(
        (status = 200, description = "The caller's posts", body = Vec<PostView>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Author role required")
    )
)]
pub async fn my_posts(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(posts::mine(&ctx, &identity)?))
}

/// POST /api/posts
///
/// Multipart fields: `title`, `category`, `about`, and an `image` file.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Author role required"),
        (status = 502, description = "Media upload failed")
    )
)]
pub async fn create_post(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut form = FormData::read(multipart?, POST_FILE_FIELDS, ctx.config.media.max_upload_bytes).await?;
    let input = NewPost {
        title: form.text_or_empty("title"),
        category: form.text_or_empty("category"),
        about: form.text_or_empty("about"),
        image: form.take_file("image"),
    };

    let post = posts::create(&ctx, &identity, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: "Blog created successfully".into(),
            post,
        }),
    ))
}

/// PUT /api/posts/{id}
///
/// Multipart; every field is optional and only those present are changed.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    request_body(content = PostForm, content_type = "multipart/form-data", description = "Only the fields present are changed"),
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid field"),
        (status = 403, description = "Not the post's author"),
        (status = 404, description = "Not found"),
        (status = 502, description = "Media upload failed")
    )
)]
pub async fn update_post(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let id = parse_post_id(&id)?;
    let mut form = FormData::read(multipart?, POST_FILE_FIELDS, ctx.config.media.max_upload_bytes).await?;
    let input = PostUpdate {
        title: form.take_text("title"),
        category: form.take_text("category"),
        about: form.take_text("about"),
        image: form.take_file("image"),
    };

    let post = posts::update(&ctx, &identity, id, input).await?;
    Ok(Json(PostResponse {
        message: "Blog updated successfully".into(),
        post,
    }))
}

/// DELETE /api/posts/{id}
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = DeleteResponse),
        (status = 403, description = "Not the post's author"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_post(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_post_id(&id)?;
    let warnings = posts::delete(&ctx, &identity, id).await?;
    Ok(Json(DeleteResponse {
        message: "Blog deleted successfully".into(),
        warnings,
    }))
}
