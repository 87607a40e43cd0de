//! Upload validation: size limit and image format sniffing.
//!
//! The declared content type of a multipart field is never trusted; the
//! format is detected from the leading bytes.

use image::ImageFormat;
use qp_core::{Error, Result};

/// Image formats accepted for photos and post images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Check that `data` is a non-empty, supported image no larger than `max_bytes`.
pub fn detect_image(data: &[u8], max_bytes: usize) -> Result<ImageKind> {
    if data.is_empty() {
        return Err(Error::Validation("image file is empty".into()));
    }
    if data.len() > max_bytes {
        return Err(Error::PayloadTooLarge(format!(
            "image is {} bytes; media.max_upload_bytes is {max_bytes}",
            data.len()
        )));
    }

    match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
        Ok(ImageFormat::Png) => Ok(ImageKind::Png),
        Ok(ImageFormat::Gif) => Ok(ImageKind::Gif),
        Ok(ImageFormat::WebP) => Ok(ImageKind::Webp),
        Ok(other) => Err(Error::Validation(format!(
            "unsupported image format {other:?} (use jpeg, png, gif or webp)"
        ))),
        Err(_) => Err(Error::Validation(
            "file is not a recognised image (use jpeg, png, gif or webp)".into(),
        )),
    }
}
