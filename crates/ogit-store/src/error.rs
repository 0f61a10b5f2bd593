use std::path::PathBuf;

use ogit_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object has no stored file.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Header or tree-entry framing is malformed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Stored bytes failed to decompress.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// The decoded type tag is not one of `blob`, `tree`, `commit`.
    #[error("unknown object type: {0:?}")]
    UnknownObjectType(String),

    /// A tree entry name cannot be represented in a tree payload.
    #[error("invalid tree entry name {name:?}: {reason}")]
    InvalidEntryName { name: String, reason: String },

    /// Filesystem read/write/stat failure.
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
