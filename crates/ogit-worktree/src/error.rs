use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error(transparent)]
    Store(#[from] ogit_store::StoreError),

    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symbolic link to a directory is not supported: {}", .0.display())]
    SymlinkedDirectory(PathBuf),

    #[error("symbolic link target does not exist: {}", .0.display())]
    DanglingSymlink(PathBuf),

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("file name is not valid UTF-8: {}", .0.display())]
    InvalidName(PathBuf),
}

impl WorktreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type WorktreeResult<T> = Result<T, WorktreeError>;
