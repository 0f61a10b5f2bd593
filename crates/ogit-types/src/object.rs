use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of an object id in raw bytes.
pub const OBJECT_ID_LEN: usize = 20;

/// Length of an object id in hex characters.
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 digest of an object's canonical encoding.
/// It has two representations that must never be mixed: 40 lowercase hex
/// characters at API boundaries (command arguments, object paths) and the
/// raw 20 bytes inside tree payloads.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Create an `ObjectId` from a pre-computed digest.
    pub const fn from_hash(hash: [u8; OBJECT_ID_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectId` from a raw byte slice, as found in tree payloads.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; OBJECT_ID_LEN] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: OBJECT_ID_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters).
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Split the hex form into the fan-out directory and file name used by
    /// the loose object layout (`id[0:2]`, `id[2:]`).
    pub fn fanout(&self) -> (String, String) {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        (dir.to_string(), file.to_string())
    }

    /// Parse from a 40-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != OBJECT_ID_HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: OBJECT_ID_HEX_LEN,
                actual: s.len(),
            });
        }
        let mut arr = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| TypeError::InvalidHex(format!("{s}: {e}")))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
