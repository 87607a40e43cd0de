//! Post reads and author-owned mutations.
//!
//! Every mutation goes through [`authorize`] for the role gate and then
//! [`can_modify`] for ownership. Image handling keeps the stored record
//! pointing at media that exists: new media is uploaded before the record
//! references it, and old media is released only after the record stops
//! referencing it.

use bytes::Bytes;
use qp_core::{AccountId, Category, Error, MediaRef, PostId, Result, Role};
use qp_db::models::{Post, PostFields};
use qp_db::pool::get_conn;
use qp_db::queries::posts;
use serde::Serialize;

use super::{authorize, discard_upload, release_media, required_text, upload_image, Identity};
use crate::context::AppContext;

/// Post projection returned over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct PostView {
    #[schema(value_type = String)]
    pub id: PostId,
    #[schema(value_type = String)]
    pub owner: AccountId,
    pub title: String,
    pub category: Category,
    pub about: String,
    /// Public URL of the post image.
    pub image: String,
    pub author_name: String,
    pub author_photo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostView {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            title: p.title,
            category: p.category,
            about: p.about,
            image: p.image.url,
            author_name: p.author_name,
            author_photo: p.author_photo,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Input for a new post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub category: String,
    pub about: String,
    pub image: Option<Bytes>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub about: Option<String>,
    pub image: Option<Bytes>,
}

/// Whether `identity` may update or delete `post`.
pub fn can_modify(identity: &Identity, post: &Post) -> bool {
    identity.role == Role::Author && post.owner == identity.account_id
}

pub async fn create(ctx: &AppContext, identity: &Identity, input: NewPost) -> Result<PostView> {
    authorize(identity, Role::Author)?;

    let title = required_text("title", &input.title)?;
    let category: Category = required_text("category", &input.category)?.parse()?;
    let about = required_text("about", &input.about)?;
    let image = input
        .image
        .ok_or_else(|| Error::Validation("image is required".into()))?;

    let media = upload_image(ctx, image).await?;

    let inserted = get_conn(&ctx.db).and_then(|conn| {
        posts::create_post(
            &conn,
            identity.account_id,
            &PostFields {
                title: &title,
                category,
                about: &about,
                image: &media,
            },
        )
    });

    match inserted {
        Ok(post) => {
            tracing::info!(post_id = %post.id, owner = %post.owner, "Post created");
            Ok(post.into())
        }
        Err(e) => {
            discard_upload(ctx, &media).await;
            Err(e)
        }
    }
}

pub async fn update(
    ctx: &AppContext,
    identity: &Identity,
    id: PostId,
    input: PostUpdate,
) -> Result<PostView> {
    authorize(identity, Role::Author)?;
    let existing = load_modifiable(ctx, identity, id)?;

    let title = match &input.title {
        Some(t) => required_text("title", t)?,
        None => existing.title.clone(),
    };
    let category = match &input.category {
        Some(c) => required_text("category", c)?.parse()?,
        None => existing.category,
    };
    let about = match &input.about {
        Some(a) => required_text("about", a)?,
        None => existing.about.clone(),
    };

    let new_media = match input.image {
        Some(data) => Some(upload_image(ctx, data).await?),
        None => None,
    };
    let image: &MediaRef = new_media.as_ref().unwrap_or(&existing.image);

    let persisted = get_conn(&ctx.db).and_then(|conn| {
        posts::update_post(
            &conn,
            id,
            &PostFields {
                title: &title,
                category,
                about: &about,
                image,
            },
        )
    });

    match persisted {
        Ok(true) => {}
        Ok(false) => {
            if let Some(media) = &new_media {
                discard_upload(ctx, media).await;
            }
            return Err(Error::not_found("post", id));
        }
        Err(e) => {
            if let Some(media) = &new_media {
                discard_upload(ctx, media).await;
            }
            return Err(e);
        }
    }

    if new_media.is_some() {
        if let Err(e) = release_media(ctx, &existing.image).await {
            tracing::warn!(
                post_id = %id,
                delete_id = %existing.image.delete_id,
                error = %e,
                "Post updated but its previous image could not be released"
            );
        }
    }

    tracing::info!(post_id = %id, "Post updated");
    get(ctx, id)
}

/// Delete a post, then release its image.
///
/// Returns warnings for cleanup that failed after the record was removed.
pub async fn delete(ctx: &AppContext, identity: &Identity, id: PostId) -> Result<Vec<String>> {
    authorize(identity, Role::Author)?;
    let existing = load_modifiable(ctx, identity, id)?;

    let removed = {
        let conn = get_conn(&ctx.db)?;
        posts::delete_post(&conn, id)?
    };
    if !removed {
        return Err(Error::not_found("post", id));
    }
    tracing::info!(post_id = %id, "Post deleted");

    let mut warnings = Vec::new();
    if let Err(e) = release_media(ctx, &existing.image).await {
        tracing::warn!(post_id = %id, error = %e, "Post deleted but its image could not be released");
        warnings.push(format!("post image could not be released: {e}"));
    }
    Ok(warnings)
}

pub fn get(ctx: &AppContext, id: PostId) -> Result<PostView> {
    let conn = get_conn(&ctx.db)?;
    posts::get_post(&conn, id)?
        .map(PostView::from)
        .ok_or_else(|| Error::not_found("post", id))
}

/// All posts newest first. A blank category means no filter.
pub fn list(ctx: &AppContext, category: Option<&str>) -> Result<Vec<PostView>> {
    let category = match category.map(str::trim) {
        Some(c) if !c.is_empty() => Some(c.parse::<Category>()?),
        _ => None,
    };
    let conn = get_conn(&ctx.db)?;
    Ok(posts::list_posts(&conn, category)?
        .into_iter()
        .map(PostView::from)
        .collect())
}

/// Posts owned by the calling author.
pub fn mine(ctx: &AppContext, identity: &Identity) -> Result<Vec<PostView>> {
    authorize(identity, Role::Author)?;
    let conn = get_conn(&ctx.db)?;
    Ok(posts::list_posts_by_owner(&conn, identity.account_id)?
        .into_iter()
        .map(PostView::from)
        .collect())
}

fn load_modifiable(ctx: &AppContext, identity: &Identity, id: PostId) -> Result<Post> {
    let post = {
        let conn = get_conn(&ctx.db)?;
        posts::get_post(&conn, id)?
    }
    .ok_or_else(|| Error::not_found("post", id))?;

    if !can_modify(identity, &post) {
        return Err(Error::Forbidden("only the post's author may modify it".into()));
    }
    Ok(post)
}
