use hive_types::{AccessRights, KindMask, StatusCode, ValueKind};

use crate::handle::Handle;

/// Errors from key store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No node exists at the requested path.
    #[error("node not found: {path}")]
    NodeNotFound { path: String },

    /// The node has no value with this name.
    #[error("value not found: {name}")]
    ValueNotFound { name: String },

    /// The handle or node does not grant the requested rights.
    #[error("access denied: {path} does not grant {requested}")]
    AccessDenied {
        path: String,
        requested: AccessRights,
    },

    /// The handle was never issued or has already been closed.
    #[error("invalid handle: {0}")]
    InvalidHandle(Handle),

    /// The stored value's kind is not in the accepted mask.
    #[error("kind mismatch for {name}: stored {actual}, accepted {expected}")]
    KindMismatch {
        name: String,
        expected: KindMask,
        actual: ValueKind,
    },

    /// The caller's buffer cannot hold the value.
    #[error("buffer too small: {required} bytes required")]
    BufferTooSmall { required: usize },

    /// A node or value name failed validation.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The data does not fit the declared kind.
    #[error("invalid data for {name}: {reason}")]
    InvalidData { name: String, reason: String },

    /// A persisted snapshot failed framing or checksum validation.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal state is unusable (poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// The status code a native store would report for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NodeNotFound { .. } | Self::ValueNotFound { .. } => StatusCode::NOT_FOUND,
            Self::AccessDenied { .. } => StatusCode::ACCESS_DENIED,
            Self::InvalidHandle(_) => StatusCode::INVALID_HANDLE,
            Self::KindMismatch { .. } | Self::InvalidData { .. } => StatusCode::INVALID_DATA,
            Self::BufferTooSmall { .. } => StatusCode::MORE_DATA,
            Self::InvalidName { .. } => StatusCode::INVALID_NAME,
            Self::Corrupt(_) | Self::Serialization(_) => StatusCode::INVALID_DATA,
            Self::Io(_) | Self::Internal(_) => StatusCode::IO,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
