//! File storage contract.

use crate::PlatformResult;
use async_trait::async_trait;
use std::time::Duration;

/// Bucketed object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `bytes` to `bucket/path` and return its public URL.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlatformResult<String>;

    /// Time-limited URL for a private object.
    async fn signed_url(&self, bucket: &str, path: &str, expires_in: Duration)
        -> PlatformResult<String>;
}
