//! Foundation types for ogit.
//!
//! Every other ogit crate depends on `ogit-types`. It is deliberately small:
//! the object identifier and the errors produced when parsing one.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- 20-byte content-addressed identifier (SHA-1 digest)

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
