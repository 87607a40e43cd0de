//! In-memory fakes for the media store and mail relay.
//!
//! Compiled for this crate's unit tests and, behind the `testing` feature,
//! for the workspace integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use qp_core::{Error, MediaRef, Result};
use qp_media::{ImageKind, MediaStore};

use crate::mailer::Mailer;

/// Smallest byte string the image sniffer accepts as PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Media store whose uploads and deletes can be made to fail.
///
/// Uploads get delete ids `fake0`, `fake1`, ... in order.
#[derive(Default)]
pub struct FakeMedia {
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    next: AtomicUsize,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Delete ids of successful uploads.
    pub fn uploaded(&self) -> Vec<String> {
        lock(&self.uploaded).clone()
    }

    /// Delete ids passed to successful deletes.
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl MediaStore for FakeMedia {
    fn name(&self) -> &'static str {
        "fake media"
    }

    async fn upload(&self, _data: Bytes, kind: ImageKind) -> Result<MediaRef> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::MediaUpload("simulated outage".into()));
        }
        let id = format!("fake{}", self.next.fetch_add(1, Ordering::SeqCst));
        lock(&self.uploaded).push(id.clone());
        Ok(MediaRef {
            url: format!("https://cdn.example/{id}.{}", kind.extension()),
            delete_id: id,
        })
    }

    async fn delete(&self, delete_id: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::upstream("fake media", "simulated outage"));
        }
        lock(&self.deleted).push(delete_id.to_string());
        Ok(())
    }
}

/// Mailer that records every message and can be made to fail.
#[derive(Default)]
pub struct RecordingMailer {
    fail: AtomicBool,
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// `(to, subject, body)` of every accepted message.
    pub fn sent(&self) -> Vec<(String, String, String)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording mailer"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Mail("relay refused message".into()));
        }
        lock(&self.sent).push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

// A panicking test thread must not wedge the other assertions.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
