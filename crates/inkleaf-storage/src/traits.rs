use crate::StorageResult;

/// String-to-string store with web-storage semantics: setting overwrites,
/// deleting a missing key is not an error.
pub trait LocalStore: Send + Sync {
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Returns whether the key was present.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    fn keys(&self) -> StorageResult<Vec<String>>;

    fn has(&self, key: &str) -> StorageResult<bool> {
        self.get(key).map(|value| value.is_some())
    }

    /// Delete every key accepted by `matches`; returns how many went.
    fn delete_where(&self, matches: &dyn Fn(&str) -> bool) -> StorageResult<usize> {
        let mut removed = 0;
        for key in self.keys()?.iter().filter(|key| matches(key.as_str())) {
            removed += usize::from(self.delete(key)?);
        }
        Ok(removed)
    }

    fn clear(&self) -> StorageResult<()> {
        self.delete_where(&|_| true).map(drop)
    }
}
