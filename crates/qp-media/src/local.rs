//! Filesystem-backed media store.
//!
//! Files are written flat into `base_dir` as `{delete_id}.{ext}`, where the
//! delete id is a content-hash prefix plus a random suffix, so two uploads of
//! the same bytes never share a file. The HTTP layer serves `base_dir` under
//! the public URL prefix.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use qp_core::{Error, MediaRef, Result};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{ImageKind, MediaStore};

/// Media store writing uploads to a local directory.
pub struct LocalMediaStore {
    base_dir: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Directory holding the stored files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Locate the stored file for `delete_id`, whatever its extension.
    fn find_file(&self, delete_id: &str) -> Option<PathBuf> {
        ["jpg", "png", "gif", "webp"]
            .iter()
            .map(|ext| self.base_dir.join(format!("{delete_id}.{ext}")))
            .find(|p| p.exists())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn name(&self) -> &'static str {
        "local media store"
    }

    async fn upload(&self, data: Bytes, kind: ImageKind) -> Result<MediaRef> {
        let delete_id = format!("{}-{}", compute_hash(&data), Uuid::new_v4().simple());
        let filename = format!("{delete_id}.{}", kind.extension());
        let path = self.base_dir.join(&filename);

        tokio::fs::write(&path, &data).await.map_err(|e| {
            Error::MediaUpload(format!("failed to write {}: {e}", path.display()))
        })?;

        tracing::debug!(file = %filename, bytes = data.len(), "Stored media file");

        Ok(MediaRef {
            url: format!("{}/{filename}", self.public_base_url),
            delete_id,
        })
    }

    async fn delete(&self, delete_id: &str) -> Result<()> {
        if !is_valid_delete_id(delete_id) {
            return Err(Error::Validation(format!("malformed media id '{delete_id}'")));
        }

        match self.find_file(delete_id) {
            Some(path) => {
                tokio::fs::remove_file(&path).await?;
                tracing::debug!(file = %path.display(), "Deleted media file");
            }
            None => {
                tracing::debug!(delete_id, "Media file already absent");
            }
        }
        Ok(())
    }
}

/// Compute the content hash for image data.
///
/// Returns the first 16 hex characters of the SHA-256 digest.
fn compute_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..8])
}

/// Delete ids are lowercase hex plus one dash; anything else could escape
/// `base_dir`.
fn is_valid_delete_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c) || c == '-')
}
