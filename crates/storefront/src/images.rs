//! Image uploads for content pages.

use crate::{StorefrontError, StorefrontResult};
use platform_client::ObjectStorage;
use tracing::info;
use uuid::Uuid;

/// Bucket holding site imagery.
pub const IMAGES_BUCKET: &str = "images";

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn object_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Upload `bytes` under a uuid-prefixed name and return the public URL.
pub async fn upload_image(
    storage: &dyn ObjectStorage,
    bucket: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> StorefrontResult<String> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(StorefrontError::required("file name"));
    }
    if bytes.is_empty() {
        return Err(StorefrontError::Validation {
            field: "image",
            reason: "is empty".to_string(),
        });
    }

    let path = format!("{}-{}", Uuid::new_v4(), object_name(file_name));
    let size = bytes.len();
    let url = storage
        .upload(bucket, &path, bytes, content_type_for(file_name))
        .await?;
    info!(bucket, path = %path, size, "uploaded image");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_client::memory::MemoryObjectStorage;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("Hero.JPG"), "image/jpeg");
        assert_eq!(content_type_for("logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_uses_unique_paths() {
        let storage = MemoryObjectStorage::new();
        let first = upload_image(&storage, IMAGES_BUCKET, "hero shot.png", vec![1])
            .await
            .unwrap();
        let second = upload_image(&storage, IMAGES_BUCKET, "hero shot.png", vec![2])
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("memory://public/images/"));
        assert!(first.ends_with("-hero-shot.png"));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_input() {
        let storage = MemoryObjectStorage::new();
        assert!(upload_image(&storage, IMAGES_BUCKET, "a.png", Vec::new())
            .await
            .is_err());
        assert!(upload_image(&storage, IMAGES_BUCKET, " ", vec![1])
            .await
            .is_err());
    }
}
