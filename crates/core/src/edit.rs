//! Canvas edits.
//!
//! The rendering shell reports every user edit as a `(field, value, index)`
//! triple. Each one maps onto exactly one store update.

use crate::error::{Error, Result};
use crate::types::{SlideImage, SlideTemplate, SlideUpdates};
use serde_json::Value;

/// One edit made on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideEdit {
    Title(String),
    Subtitle(String),
    /// Replace one entry of the body.
    BodyLine { index: usize, text: String },
    Image(SlideImage),
    Template(SlideTemplate),
}

impl SlideEdit {
    /// Interpret an edit reported by the shell.
    ///
    /// Returns `None` for unknown fields, for values of the wrong type, and
    /// for body edits without an index.
    pub fn from_field(field: &str, value: &Value, index: Option<usize>) -> Option<Self> {
        match field {
            "title" => value.as_str().map(|s| Self::Title(s.to_string())),
            "subtitle" => value.as_str().map(|s| Self::Subtitle(s.to_string())),
            "bodyContent" => {
                let index = index?;
                value.as_str().map(|s| Self::BodyLine {
                    index,
                    text: s.to_string(),
                })
            }
            "image" | "imageUrl" => match value {
                Value::String(url) => Some(Self::Image(SlideImage::new(url.clone()))),
                Value::Object(_) => serde_json::from_value(value.clone()).ok().map(Self::Image),
                _ => None,
            },
            "template" => value
                .as_str()
                .map(|id| Self::Template(SlideTemplate::from_id(id).unwrap_or(SlideTemplate::Default))),
            _ => {
                log::warn!("Ignoring edit of unknown field {}", field);
                None
            }
        }
    }

    /// The equivalent plain field update, for edits that need no slide context.
    pub fn into_updates(self) -> Option<SlideUpdates> {
        match self {
            Self::Title(title) => Some(SlideUpdates::title(title)),
            Self::Subtitle(subtitle) => Some(SlideUpdates::subtitle(subtitle)),
            Self::Image(image) => Some(SlideUpdates::image(image)),
            Self::BodyLine { .. } | Self::Template(_) => None,
        }
    }
}

/// MIME types accepted for uploaded images.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Check an uploaded image file before it is turned into a data URI.
pub fn check_image_upload(mime_type: &str, size: u64) -> Result<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime_type) {
        return Err(Error::Asset(format!(
            "Please upload a valid image file ({})",
            ALLOWED_IMAGE_TYPES.join(", ")
        )));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(Error::Asset(format!(
            "File size must be less than {}MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Whether a pasted image reference looks like an absolute URL or a data URI.
pub fn is_image_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let scheme_ok = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && !rest.is_empty()
}
