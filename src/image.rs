//! Image reference normalization.
//!
//! The upstream API accepts images either as remote URLs or as inline
//! data URIs. Local file paths are read and inlined before submission.

use crate::error::{Result, ViduError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::Path;
use tracing::debug;

/// Prefixes that are passed through to the API unchanged.
const PASSTHROUGH_PREFIXES: [&str; 3] = ["http://", "https://", "data:"];

/// Prefix used when inlining local files.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Maximum number of images accepted by a multi-image request.
pub const MAX_IMAGES: usize = 3;

/// Whether the reference is already in a form the API accepts.
pub fn is_passthrough(image: &str) -> bool {
    PASSTHROUGH_PREFIXES
        .iter()
        .any(|prefix| image.starts_with(prefix))
}

/// Normalize a single image reference.
///
/// URLs and data URIs are returned unchanged; anything else is treated as a
/// local path and inlined as a base64 JPEG data URI.
pub async fn normalize_image(image: &str) -> Result<String> {
    if is_passthrough(image) {
        return Ok(image.to_string());
    }

    let path = Path::new(image);
    let is_file = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_file(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };
    if !is_file {
        return Err(ViduError::InvalidInput(format!(
            "image does not exist: {}",
            image
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    debug!("Inlined local image {} ({} bytes)", path.display(), bytes.len());

    Ok(format!("{}{}", JPEG_DATA_URI_PREFIX, BASE64.encode(bytes)))
}

/// Normalize an ordered list of 1 to [`MAX_IMAGES`] image references.
///
/// Order is preserved; the first invalid element aborts the batch.
pub async fn normalize_images(images: &[String]) -> Result<Vec<String>> {
    if images.is_empty() {
        return Err(ViduError::InvalidInput("images is required".to_string()));
    }
    if images.len() > MAX_IMAGES {
        return Err(ViduError::InvalidInput(format!(
            "at most {} images are accepted, got {}",
            MAX_IMAGES,
            images.len()
        )));
    }

    let mut normalized = Vec::with_capacity(images.len());
    for image in images {
        normalized.push(normalize_image(image).await?);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_urls_pass_through() {
        for input in [
            "https://example.com/cat.png",
            "http://example.com/dog.jpg",
            "data:image/png;base64,iVBORw0KGgo=",
        ] {
            assert_eq!(normalize_image(input).await.unwrap(), input);
        }
    }

    #[tokio::test]
    async fn test_local_file_is_inlined() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bytes: Vec<u8> = (0u8..=255).collect();
        file.write_all(&bytes).unwrap();

        let path = file.path().to_string_lossy().to_string();
        let uri = normalize_image(&path).await.unwrap();

        assert!(uri.starts_with(JPEG_DATA_URI_PREFIX));
        let decoded = BASE64.decode(&uri[JPEG_DATA_URI_PREFIX.len()..]).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_input() {
        let err = normalize_image("/definitely/not/here.jpg").await.unwrap_err();
        assert!(matches!(err, ViduError::InvalidInput(_)));
        assert!(err.to_string().contains("/definitely/not/here.jpg"));
    }

    #[tokio::test]
    async fn test_directory_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let err = normalize_image(&path).await.unwrap_err();
        assert!(matches!(err, ViduError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"frame").unwrap();
        let local = file.path().to_string_lossy().to_string();

        let images = vec!["https://example.com/a.png".to_string(), local];
        let normalized = normalize_images(&images).await.unwrap();

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0], "https://example.com/a.png");
        assert_eq!(normalized[1], format!("{}{}", JPEG_DATA_URI_PREFIX, BASE64.encode(b"frame")));
    }

    #[tokio::test]
    async fn test_batch_fails_on_first_invalid() {
        let images = vec![
            "https://example.com/a.png".to_string(),
            "missing-one.jpg".to_string(),
            "missing-two.jpg".to_string(),
        ];
        let err = normalize_images(&images).await.unwrap_err();
        assert!(err.to_string().contains("missing-one.jpg"));
    }

    #[tokio::test]
    async fn test_batch_size_bounds() {
        assert!(normalize_images(&[]).await.is_err());

        let too_many = vec!["https://example.com/x.png".to_string(); MAX_IMAGES + 1];
        let err = normalize_images(&too_many).await.unwrap_err();
        assert!(matches!(err, ViduError::InvalidInput(_)));
    }
}
