//! Loading image bytes for embedding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use deck_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Image formats the writer can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Detect format from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }
        None
    }

    /// Extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }
}

/// Resolve an image reference to its bytes.
///
/// Accepts base64 `data:` URIs and local file paths (relative paths are
/// resolved against `base_dir`). Remote URLs are not fetched.
pub fn load_image(url: &str, base_dir: Option<&Path>) -> Result<(Vec<u8>, ImageFormat)> {
    if let Some(rest) = url.strip_prefix("data:") {
        return decode_data_uri(rest);
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        return Err(Error::Asset(format!("remote images are not fetched: {}", url)));
    }

    let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    };

    let bytes = std::fs::read(&path)
        .map_err(|e| Error::Asset(format!("cannot read {}: {}", path.display(), e)))?;

    let format = ImageFormat::from_magic(&bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .ok_or_else(|| Error::Asset(format!("unsupported image format: {}", path.display())))?;

    Ok((bytes, format))
}

fn decode_data_uri(rest: &str) -> Result<(Vec<u8>, ImageFormat)> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Asset("malformed data URI".to_string()))?;

    let mut params = meta.split(';');
    let mime = params.next().unwrap_or_default();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(Error::Asset("only base64 data URIs can be embedded".to_string()));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::Asset(format!("invalid base64 image data: {}", e)))?;

    let format = ImageFormat::from_mime(mime)
        .or_else(|| ImageFormat::from_magic(&bytes))
        .ok_or_else(|| Error::Asset(format!("unsupported image type: {}", mime)))?;

    Ok((bytes, format))
}
