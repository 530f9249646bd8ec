use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Namespace the game keeps its values under.
pub const NAMESPACE: &str = "simon";
/// Key of the persisted record.
pub const HIGH_SCORE_KEY: &str = "high_score";

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached, opened or written.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        #[source]
        /// Backend failure.
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored value could not be decoded.
    #[error("stored value for `{key}` is corrupt: {message}")]
    Corrupt {
        /// Key that was read.
        key: String,
        /// Decoder message.
        message: String,
    },
    /// An operation was attempted before [`PersistentStore::open`] succeeded.
    #[error("store is not open")]
    NotOpen,
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Small key/value store for named non-negative integers.
pub trait PersistentStore: Send {
    /// Prepare the backend; called once before any other operation.
    fn open(&mut self) -> StorageResult<()>;

    /// Value stored under `key`, `None` when absent.
    fn load(&mut self, key: &str) -> StorageResult<Option<u32>>;

    /// Durably store `value` under `key`.
    fn save(&mut self, key: &str, value: u32) -> StorageResult<()>;
}
