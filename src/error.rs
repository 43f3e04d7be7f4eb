use crate::object::Oid;

/// The full taxonomy of ways a clone can fail.
///
/// Every fallible operation in this crate returns one of these variants (never
/// a bare [`std::io::Error`] or an opaque string) so callers — and tests —
/// can match on `kind` rather than parse messages.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("corrupt bundle: {0}")]
    CorruptBundle(String),

    #[error("bundle checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported object format: {0}")]
    UnsupportedFormat(String),

    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("corrupt delta: {0}")]
    CorruptDelta(String),

    #[error("missing base object {0}")]
    MissingBase(Oid),

    #[error("corrupt object: {0}")]
    CorruptObject(String),

    #[error("varint overflow: continuation tail exceeded 60 bits of shift")]
    VarintOverflow,

    #[error("default branch not found in advertisement")]
    DefaultBranchNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitError>;
