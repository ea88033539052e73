//! The two local storage scopes cleared together on sign-out.

use crate::{LocalStore, MemoryStore, StorageKeys, StorageResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Session-scoped and persistent stores.
#[derive(Clone)]
pub struct StorageScopes {
    /// Lives for the process, like a browser tab's session storage.
    pub session: Arc<dyn LocalStore>,
    /// Survives restarts, like a browser's local storage.
    pub persistent: Arc<dyn LocalStore>,
}

impl StorageScopes {
    pub fn new(session: Arc<dyn LocalStore>, persistent: Arc<dyn LocalStore>) -> Self {
        Self {
            session,
            persistent,
        }
    }

    /// Two independent in-memory scopes.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Wipe both scopes. Both are attempted even if the first fails; the
    /// first error is returned.
    pub fn clear_all(&self) -> StorageResult<()> {
        let session = self.session.clear();
        let persistent = self.persistent.clear();
        if let Err(e) = &session {
            warn!(error = %e, "failed to clear session storage");
        }
        if let Err(e) = &persistent {
            warn!(error = %e, "failed to clear persistent storage");
        }
        session.and(persistent)
    }

    /// Remove only authentication entries from both scopes, keeping
    /// unrelated preferences. Returns how many keys were removed.
    pub fn purge_auth_keys(&self) -> StorageResult<usize> {
        let session = self.session.delete_where(&StorageKeys::is_auth_key)?;
        let removed = session + self.persistent.delete_where(&StorageKeys::is_auth_key)?;
        debug!(removed, "purged auth keys");
        Ok(removed)
    }
}

impl std::fmt::Debug for StorageScopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageScopes").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    struct FailingStore;

    impl LocalStore for FailingStore {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Platform("read-only".into()))
        }
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }
        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Platform("read-only".into()))
        }
        fn keys(&self) -> StorageResult<Vec<String>> {
            Err(StorageError::Platform("read-only".into()))
        }
    }

    #[test]
    fn clear_all_wipes_both_scopes() {
        let scopes = StorageScopes::in_memory();
        scopes.session.set("cart", "[]").unwrap();
        scopes.persistent.set("sb-x-auth-token", "{}").unwrap();

        scopes.clear_all().unwrap();

        assert!(scopes.session.keys().unwrap().is_empty());
        assert!(scopes.persistent.keys().unwrap().is_empty());
    }

    #[test]
    fn clear_all_still_clears_second_scope_when_first_fails() {
        let persistent = Arc::new(MemoryStore::new());
        persistent.set("sb-x-auth-token", "{}").unwrap();
        let scopes = StorageScopes::new(Arc::new(FailingStore), persistent.clone());

        assert!(scopes.clear_all().is_err());
        assert!(persistent.is_empty());
    }

    #[test]
    fn purge_auth_keys_keeps_preferences() {
        let scopes = StorageScopes::in_memory();
        scopes.persistent.set("sb-x-auth-token", "{}").unwrap();
        scopes.persistent.set("theme", "dark").unwrap();
        scopes.session.set("supabase.auth.token", "{}").unwrap();

        assert_eq!(scopes.purge_auth_keys().unwrap(), 2);
        assert_eq!(scopes.persistent.keys().unwrap(), vec!["theme".to_string()]);
        assert!(scopes.session.keys().unwrap().is_empty());
    }
}
