use hive_store::StoreError;
use hive_types::{AccessRights, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    /// The store could not open the node; no accessor was created.
    #[error("failed to open {path} for {rights}: status {status}")]
    Open {
        path: String,
        rights: AccessRights,
        status: StatusCode,
        #[source]
        source: StoreError,
    },

    #[error("invalid accessor config: {0}")]
    Config(String),
}

impl KeyError {
    /// Store status carried by an open failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Open { status, .. } => Some(*status),
            Self::Config(_) => None,
        }
    }
}

pub type KeyResult<T> = Result<T, KeyError>;
