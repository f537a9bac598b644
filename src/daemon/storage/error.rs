use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of the entry log. Validation failures are rejected before anything touches the
/// disk, corrupt data is reported but never deleted or overwritten.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("'{0}' is not one of the fixed categories")]
    Validation(String),
    #[error("failed to access the entry log")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize an entry")]
    Serialize(#[from] serde_json::Error),
    #[error("entry log {path:?} is unreadable; the file was left untouched")]
    CorruptData { path: PathBuf },
}
