//! Route handlers for the HTTP API.

pub mod auth;
pub mod contact;
pub mod health;
pub mod posts;
pub mod users;

use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart};
use axum::http::StatusCode;
use bytes::Bytes;
use qp_core::{Error, PostId, Result};

use crate::error::AppError;

/// `Json` whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// A multipart form split into text fields and file parts.
///
/// Empty file parts are dropped, since browsers send one when no file was
/// chosen.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    text: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl FormData {
    /// Read every part of `multipart`. Parts named in `file_fields` are kept
    /// as raw bytes; everything else must be UTF-8 text. `max_upload_bytes`
    /// only shapes the error reported when the body limit cuts a part short.
    pub(crate) async fn read(
        mut multipart: Multipart,
        file_fields: &[&str],
        max_upload_bytes: usize,
    ) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("multipart body", &e, max_upload_bytes))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if file_fields.contains(&name.as_str()) {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&name, &e, max_upload_bytes))?;
                if !data.is_empty() {
                    form.files.insert(name, data);
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&name, &e, max_upload_bytes))?;
                form.text.insert(name, value);
            }
        }

        Ok(form)
    }

    pub(crate) fn take_text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name)
    }

    /// Text field or empty string; emptiness is reported by the service.
    pub(crate) fn text_or_empty(&mut self, name: &str) -> String {
        self.take_text(name).unwrap_or_default()
    }

    pub(crate) fn take_file(&mut self, name: &str) -> Option<Bytes> {
        self.files.remove(name)
    }
}

fn multipart_error(part: &str, e: &MultipartError, max_upload_bytes: usize) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(format!(
            "'{part}' exceeds the upload limit (media.max_upload_bytes = {max_upload_bytes})"
        ))
    } else {
        Error::Validation(format!("failed to read '{part}': {}", e.body_text()))
    }
}

/// Parse a post id from the path. Anything unparseable cannot name a post.
pub(crate) fn parse_post_id(raw: &str) -> Result<PostId> {
    raw.parse().map_err(|_| Error::not_found("post", raw))
}
