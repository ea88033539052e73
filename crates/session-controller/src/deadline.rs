//! Upper bound on every collaborator call.

use crate::SessionError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `future`, failing with [`SessionError::Timeout`] if it has not
/// finished within `after`. The inner result is returned untouched so the
/// caller still distinguishes an explicit rejection from a deadline miss.
pub async fn with_deadline<F>(
    operation: &str,
    after: Duration,
    future: F,
) -> Result<F::Output, SessionError>
where
    F: Future,
{
    match tokio::time::timeout(after, future).await {
        Ok(output) => Ok(output),
        Err(_) => {
            warn!(
                operation,
                timeout = true,
                after_ms = after.as_millis() as u64,
                "collaborator call exceeded deadline"
            );
            Err(SessionError::Timeout {
                operation: operation.to_string(),
                after,
            })
        }
    }
}
