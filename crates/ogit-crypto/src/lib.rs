//! Content hashing for ogit.
//!
//! Object identifiers are the SHA-1 digest of an object's canonical
//! encoding. SHA-1 is kept for compatibility with git's on-disk format, not
//! for its security properties.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
