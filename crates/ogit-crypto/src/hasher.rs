use ogit_types::{ObjectId, OBJECT_ID_LEN};
use sha1::{Digest, Sha1};

/// SHA-1 content hasher.
///
/// The digest is always computed over an object's canonical encoding
/// (`"<type> <len>\0<payload>"`), never over its compressed form. The type
/// header plays the role of a domain tag: a blob and a tree with identical
/// payload bytes hash differently.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Digest a complete canonical encoding.
    pub fn digest(data: &[u8]) -> ObjectId {
        Self::digest_parts(&[data])
    }

    /// Digest the concatenation of `parts` without materialising it.
    ///
    /// `digest_parts(&[header, payload])` equals `digest(header ++ payload)`.
    pub fn digest_parts(parts: &[&[u8]]) -> ObjectId {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }
        let mut out = [0u8; OBJECT_ID_LEN];
        out.copy_from_slice(&hasher.finalize());
        ObjectId::from_hash(out)
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(data: &[u8], expected: &ObjectId) -> bool {
        Self::digest(data) == *expected
    }
}
