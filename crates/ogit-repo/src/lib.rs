//! High-level repository API for ogit.
//!
//! Ties the object store and the tree builder to a repository layout on
//! disk. This is the main entry point for the CLI and for applications
//! embedding ogit.

pub mod config;
pub mod error;
pub mod repository;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use repository::Repository;

// Re-export key types
pub use ogit_store::{Blob, EntryMode, ObjectKind, RawObject, Tree, TreeEntry};
pub use ogit_types::ObjectId;
