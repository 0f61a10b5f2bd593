//! Content-addressed object storage for ogit.
//!
//! This crate implements git's loose object format: every object is framed
//! as `"<type> <len>\0<payload>"`, identified by the SHA-1 of that framing,
//! zlib-compressed, and written to `objects/<id[0:2]>/<id[2:]>`.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file contents
//! - [`Tree`] -- directory listing mapping names to object ids
//! - commits are recognised by the codec ([`ObjectKind::Commit`]) but never
//!   decoded
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object on disk
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. The id is computed from the uncompressed canonical encoding.
//! 3. Writes are idempotent; racing writers of the same id are harmless.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod compress;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use compress::Compressor;
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, EntryMode, ObjectKind, RawObject, Tree, TreeEntry};
pub use traits::ObjectStore;
