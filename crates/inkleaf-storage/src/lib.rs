//! Local key/value storage for the storefront tools.
//!
//! Two scopes mirror what a browser offers a web client:
//! - **session**: [`MemoryStore`], gone when the process exits
//! - **persistent**: [`FileStore`], a JSON file under `~/.inkleaf/storage`

mod file;
mod keys;
mod memory;
mod scopes;
mod traits;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use scopes::StorageScopes;
pub use traits::LocalStore;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The store refused the write.
    #[error("storage backend rejected the operation: {0}")]
    Platform(String),

    /// The backing file is not a JSON object of strings.
    #[error("unreadable store contents: {0}")]
    Encoding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default scopes: in-memory session storage and a file-backed
/// persistent store at `persistent_path`.
pub fn create_scopes(persistent_path: &Path) -> StorageResult<StorageScopes> {
    let persistent = FileStore::open(persistent_path)?;
    Ok(StorageScopes::new(
        Arc::new(MemoryStore::new()),
        Arc::new(persistent),
    ))
}
