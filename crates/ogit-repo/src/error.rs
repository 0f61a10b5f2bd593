use std::path::PathBuf;

use ogit_store::ObjectKind;
use ogit_types::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not a repository (or any parent up to the filesystem root): {}", .0.display())]
    NotARepository(PathBuf),

    #[error("object {id} is a {kind}, not a tree")]
    NotATree { id: ObjectId, kind: ObjectKind },

    #[error(transparent)]
    Type(#[from] ogit_types::TypeError),

    #[error(transparent)]
    Store(#[from] ogit_store::StoreError),

    #[error(transparent)]
    Worktree(#[from] ogit_worktree::WorktreeError),

    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
