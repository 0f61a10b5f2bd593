//! Working tree snapshots for ogit.
//!
//! [`TreeBuilder`] walks a directory and writes a blob for every file and a
//! tree for every directory, returning the root tree's id. Which names are
//! skipped is decided by an injected [`IgnoreSet`]; the builder itself knows
//! nothing about the repository's metadata directory.

pub mod builder;
pub mod error;
pub mod ignore;

pub use builder::TreeBuilder;
pub use error::{WorktreeError, WorktreeResult};
pub use ignore::IgnoreSet;
