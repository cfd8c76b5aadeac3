use thiserror::Error;

/// Errors produced while encoding or decoding value buffers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("string contains an interior NUL at byte {position}")]
    InteriorNul { position: usize },

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("buffer is not NUL-terminated")]
    Unterminated,

    #[error("invalid UTF-8 in stored text: {0}")]
    InvalidUtf8(String),

    #[error("unknown value kind: {0}")]
    UnknownKind(String),
}
