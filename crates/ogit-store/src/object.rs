use std::cmp::Ordering;

use ogit_crypto::ContentHasher;
use ogit_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw file contents.
    Blob,
    /// Directory listing: ordered entries mapping names to object ids.
    Tree,
    /// Commit object. Recognised by the codec, never decoded.
    Commit,
}

impl ObjectKind {
    /// The type name written in the canonical header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a header type name.
    pub fn from_name(name: &str) -> StoreResult<Self> {
        match name {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(StoreError::UnknownObjectType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded object: kind tag plus payload bytes.
///
/// `RawObject` is the unit the store reads and writes. Its canonical
/// encoding (`"<kind> <len>\0<payload>"`) is what gets hashed and
/// compressed; the store never interprets the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The payload bytes, without header.
    pub payload: Vec<u8>,
}

impl RawObject {
    /// Create a new raw object from kind and payload.
    pub fn new(kind: ObjectKind, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// Payload size in bytes, as written in the header.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// The canonical encoding of this object.
    pub fn encode(&self) -> Vec<u8> {
        codec::encode(self.kind, &self.payload)
    }

    /// Compute the content-addressed ID without encoding into a new buffer.
    pub fn compute_id(&self) -> ObjectId {
        let header = codec::header(self.kind, self.payload.len());
        ContentHasher::digest_parts(&[header.as_slice(), self.payload.as_slice()])
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw file contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `RawObject` for storage.
    pub fn into_raw_object(self) -> RawObject {
        RawObject::new(ObjectKind::Blob, self.data)
    }

    /// Decode from a `RawObject`.
    pub fn from_raw_object(obj: RawObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(StoreError::Decode(format!("expected blob, got {}", obj.kind)));
        }
        Ok(Self { data: obj.payload })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (100644).
    Regular,
    /// Executable file (100755). Only produced by other tools.
    Executable,
    /// Symbolic link (120000). Only produced by other tools.
    Symlink,
    /// Subtree / directory (40000).
    Directory,
}

impl EntryMode {
    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            _ => None,
        }
    }

    /// Returns `true` for subtree entries.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// The kind of object an entry with this mode points at.
    pub fn object_kind(&self) -> ObjectKind {
        if self.is_directory() {
            ObjectKind::Tree
        } else {
            ObjectKind::Blob
        }
    }
}

/// Formats as octal without a leading zero, the way tree payloads store it
/// (`40000`, `100644`). Use `{:06o}` on [`EntryMode::mode_bits`] for the
/// padded form `ls-tree` prints.
impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// File mode.
    pub mode: EntryMode,
    /// Single path segment: non-empty, no `/`, no NUL.
    pub name: String,
    /// ID of the referenced blob or tree.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// Check that `name` can be stored in a tree payload.
    pub fn validate_name(name: &str) -> StoreResult<()> {
        let reason = if name.is_empty() {
            "name is empty"
        } else if name.contains('/') {
            "name contains '/'"
        } else if name.contains('\0') {
            "name contains NUL"
        } else {
            return Ok(());
        };
        Err(StoreError::InvalidEntryName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Canonical tree order: raw name bytes, with directory names compared
    /// as if they ended in `/`.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let a = self.name.as_bytes().iter().chain(self.sort_suffix());
        let b = other.name.as_bytes().iter().chain(other.sort_suffix());
        a.cmp(b)
    }

    fn sort_suffix(&self) -> &'static [u8] {
        if self.mode.is_directory() {
            b"/".as_slice()
        } else {
            &[]
        }
    }
}

/// Directory listing object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Entries in payload order.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are put in canonical order so the id does not depend on the
    /// order they were collected in.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(TreeEntry::canonical_cmp);
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Convert into a `RawObject` for storage.
    ///
    /// Fails if any entry name cannot be represented in a tree payload.
    pub fn to_raw_object(&self) -> StoreResult<RawObject> {
        for entry in &self.entries {
            TreeEntry::validate_name(&entry.name)?;
        }
        Ok(RawObject::new(
            ObjectKind::Tree,
            codec::encode_tree_entries(&self.entries),
        ))
    }

    /// Decode from a `RawObject`, keeping the stored entry order.
    pub fn from_raw_object(obj: &RawObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(StoreError::Decode(format!("expected tree, got {}", obj.kind)));
        }
        Ok(Self {
            entries: codec::decode_tree_entries(&obj.payload)?,
        })
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
