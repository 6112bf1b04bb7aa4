use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("malformed value in slot `{key}`")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an error for a slot whose content cannot be decoded.
    pub fn malformed(key: &str, source: serde_json::Error) -> Self {
        StorageError::Malformed {
            key: key.to_string(),
            source,
        }
    }
}

/// Named string slots, the way a browser's local storage exposes them.
pub trait SlotStore: Send + Sync {
    /// Read a slot, `None` when it was never written or has been removed.
    fn read(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Replace the content of a slot.
    fn write(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove a slot; removing a missing slot succeeds.
    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>>;
}
