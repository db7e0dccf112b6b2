//! Storage for uploaded images.
//!
//! Avatars and recipe pictures arrive as base64 data URLs
//! (`data:image/png;base64,...`) inside JSON payloads. They are decoded,
//! sniffed with the `image` crate and written under `MEDIA_ROOT`; responses
//! carry absolute `/media/...` URLs.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::{ImageFormat, ImageReader};
use thiserror::Error;
use uuid::Uuid;

pub const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("expected a base64 data URL (data:image/...;base64,...)")]
    NotADataUrl,

    #[error("invalid base64 image data")]
    InvalidBase64,

    #[error("image data exceeds {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    #[error("unsupported image format; allowed: JPEG, PNG, GIF, WebP")]
    UnsupportedFormat,

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Splits a `data:image/...;base64,` URL and decodes the payload.
pub fn decode_data_url(input: &str) -> Result<Vec<u8>, MediaError> {
    let rest = input.strip_prefix("data:image/").ok_or(MediaError::NotADataUrl)?;
    let (_, encoded) = rest.split_once(";base64,").ok_or(MediaError::NotADataUrl)?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| MediaError::InvalidBase64)?;

    if data.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge);
    }

    Ok(data)
}

/// Detects the actual format from magic bytes; the data-URL mime is not
/// trusted. Returns the canonical file extension.
fn sniff_extension(data: &[u8]) -> Result<&'static str, MediaError> {
    let format = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| MediaError::UnsupportedFormat)?
        .format()
        .ok_or(MediaError::UnsupportedFormat)?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(MediaError::UnsupportedFormat);
    }

    format
        .extensions_str()
        .first()
        .copied()
        .ok_or(MediaError::UnsupportedFormat)
}

/// Decodes a data URL and writes the image under `media_root/subdir/`.
/// Returns the path relative to the media root, e.g. `recipes/<uuid>.png`.
pub fn store_image(media_root: &Path, subdir: &str, data_url: &str) -> Result<String, MediaError> {
    let data = decode_data_url(data_url)?;
    let ext = sniff_extension(&data)?;

    let dir = media_root.join(subdir);
    fs::create_dir_all(&dir)?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    fs::write(dir.join(&filename), &data)?;

    Ok(format!("{}/{}", subdir, filename))
}

/// Best-effort removal of a stored image, e.g. after its row was replaced.
pub fn remove_image(media_root: &Path, relative_path: &str) {
    let path = media_root.join(relative_path);
    if let Err(e) = fs::remove_file(&path) {
        tracing::warn!("Failed to remove media file {}: {}", path.display(), e);
    }
}

/// Absolute URL for a stored media path.
pub fn media_url(base_url: &str, relative_path: &str) -> String {
    format!("{}/media/{}", base_url, relative_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG: 1x1 transparent pixel.
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn png_data_url() -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(PNG_1X1)
        )
    }

    #[test]
    fn test_decode_data_url_roundtrip() {
        let decoded = decode_data_url(&png_data_url()).unwrap();
        assert_eq!(decoded, PNG_1X1);
    }

    #[test]
    fn test_decode_rejects_plain_base64() {
        let err = decode_data_url("aGVsbG8=").unwrap_err();
        assert!(matches!(err, MediaError::NotADataUrl));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_data_url("data:image/png;base64,!!!").unwrap_err();
        assert!(matches!(err, MediaError::InvalidBase64));
    }

    #[test]
    fn test_sniff_detects_png_regardless_of_claimed_mime() {
        // Claimed jpeg, actual png: the sniffed extension wins.
        let url = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(PNG_1X1)
        );
        let data = decode_data_url(&url).unwrap();
        assert_eq!(sniff_extension(&data).unwrap(), "png");
    }

    #[test]
    fn test_sniff_rejects_non_image_bytes() {
        assert!(matches!(
            sniff_extension(b"just some text"),
            Err(MediaError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_store_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let rel = store_image(&dir, "avatars", &png_data_url()).unwrap();
        assert!(rel.starts_with("avatars/"));
        assert!(rel.ends_with(".png"));
        assert!(dir.join(&rel).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_media_url() {
        assert_eq!(
            media_url("http://localhost:3000", "avatars/x.png"),
            "http://localhost:3000/media/avatars/x.png"
        );
    }
}
