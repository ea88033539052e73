//! In-memory object storage.

use super::Behavior;
use crate::{ObjectStorage, PlatformError, PlatformResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// [`ObjectStorage`] keeping uploads in a map keyed by `bucket/path`.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    behavior: Mutex<Behavior>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    /// Content type and bytes stored at `bucket/path`.
    pub fn object(&self, bucket: &str, path: &str) -> Option<(String, Vec<u8>)> {
        self.objects.lock().get(&format!("{bucket}/{path}")).cloned()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlatformResult<String> {
        let behavior = self.behavior.lock().clone();
        behavior.apply().await?;

        let key = format!("{bucket}/{path}");
        let mut objects = self.objects.lock();
        if objects.contains_key(&key) {
            return Err(PlatformError::Conflict(format!("{key} already exists")));
        }
        objects.insert(key.clone(), (content_type.to_string(), bytes));
        Ok(format!("memory://public/{key}"))
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> PlatformResult<String> {
        let behavior = self.behavior.lock().clone();
        behavior.apply().await?;

        let key = format!("{bucket}/{path}");
        if !self.objects.lock().contains_key(&key) {
            return Err(PlatformError::Api {
                status: 404,
                code: None,
                message: format!("{key} not found"),
            });
        }
        Ok(format!(
            "memory://signed/{key}?expires_in={}",
            expires_in.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_sign() {
        let storage = MemoryObjectStorage::new();
        let url = storage
            .upload("images", "a.png", vec![1, 2], "image/png")
            .await
            .unwrap();
        assert_eq!(url, "memory://public/images/a.png");
        assert_eq!(
            storage.object("images", "a.png"),
            Some(("image/png".to_string(), vec![1, 2]))
        );

        let signed = storage
            .signed_url("images", "a.png", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(signed.ends_with("expires_in=60"));
    }

    #[tokio::test]
    async fn duplicate_upload_conflicts() {
        let storage = MemoryObjectStorage::new();
        storage.upload("b", "x", vec![], "text/plain").await.unwrap();
        assert!(matches!(
            storage.upload("b", "x", vec![], "text/plain").await,
            Err(PlatformError::Conflict(_))
        ));
    }
}
