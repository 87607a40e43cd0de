//! qp-media: where uploaded images live.
//!
//! The [`MediaStore`] trait is the seam between the blog core and whatever
//! hosts the bytes. [`LocalMediaStore`] keeps files on disk and hands out URLs
//! under a configurable public prefix. [`detect_image`] validates uploads
//! before they reach any store.

pub mod local;
pub mod validate;

use async_trait::async_trait;
use bytes::Bytes;
use qp_core::{MediaRef, Result};

pub use local::LocalMediaStore;
pub use validate::{detect_image, ImageKind};

/// A durable home for uploaded images.
///
/// `upload` must only return once the bytes are durably stored; callers
/// persist the returned [`MediaRef`] immediately afterwards. `delete` is
/// best-effort from the caller's point of view and must be idempotent.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Short name used in logs and upstream errors.
    fn name(&self) -> &'static str;

    /// Store `data` and return its public URL and deletion handle.
    async fn upload(&self, data: Bytes, kind: ImageKind) -> Result<MediaRef>;

    /// Release a previously uploaded object.
    async fn delete(&self, delete_id: &str) -> Result<()>;
}
