//! Canonical object framing.
//!
//! Every object is encoded as:
//!
//! ```text
//! <type> SP <decimal payload length> NUL <payload>
//! ```
//!
//! Tree payloads are a concatenation of entries:
//!
//! ```text
//! <octal mode> SP <name> NUL <20 raw id bytes>
//! ```

use ogit_types::{ObjectId, OBJECT_ID_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{EntryMode, ObjectKind, RawObject, TreeEntry};

/// The `"<type> <len>\0"` header for a payload of `len` bytes.
pub fn header(kind: ObjectKind, len: usize) -> Vec<u8> {
    format!("{} {}\0", kind.as_str(), len).into_bytes()
}

/// Encode `payload` with its canonical header.
pub fn encode(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut buf = header(kind, payload.len());
    buf.reserve_exact(payload.len());
    buf.extend_from_slice(payload);
    buf
}

/// Split a canonical encoding into kind and payload.
///
/// The header must contain exactly one space, its length field must be a
/// decimal number equal to the payload length, and the type must be one of
/// `blob`, `tree`, `commit`.
pub fn decode(bytes: &[u8]) -> StoreResult<RawObject> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| StoreError::Decode("object header is not NUL-terminated".into()))?;
    let header = std::str::from_utf8(&bytes[..nul])
        .map_err(|_| StoreError::Decode("object header is not valid UTF-8".into()))?;

    let (type_name, len) = header
        .split_once(' ')
        .ok_or_else(|| StoreError::Decode(format!("malformed object header {header:?}")))?;
    if type_name.is_empty() || len.contains(' ') {
        return Err(StoreError::Decode(format!("malformed object header {header:?}")));
    }
    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::Decode(format!("invalid object length {len:?}")));
    }
    let declared: usize = len
        .parse()
        .map_err(|_| StoreError::Decode(format!("invalid object length {len:?}")))?;

    let kind = ObjectKind::from_name(type_name)?;
    let payload = &bytes[nul + 1..];
    if payload.len() != declared {
        return Err(StoreError::Decode(format!(
            "length mismatch: header says {declared}, payload has {}",
            payload.len()
        )));
    }
    Ok(RawObject::new(kind, payload.to_vec()))
}

/// Encode tree entries in the order given.
///
/// Names are not validated here; [`crate::Tree::to_raw_object`] does that.
pub fn encode_tree_entries(entries: &[TreeEntry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(entries.len() * (OBJECT_ID_LEN + 32));
    for entry in entries {
        buf.extend_from_slice(entry.mode.to_string().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(entry.name.as_bytes());
        buf.push(0);
        buf.extend_from_slice(entry.object_id.as_bytes());
    }
    buf
}

/// Parse a tree payload into its entries, keeping payload order.
pub fn decode_tree_entries(payload: &[u8]) -> StoreResult<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut rest = payload;

    while !rest.is_empty() {
        let offset = payload.len() - rest.len();
        let nul = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            StoreError::Decode(format!("tree entry at offset {offset} has no NUL terminator"))
        })?;
        let head = &rest[..nul];
        let space = head.iter().position(|&b| b == b' ').ok_or_else(|| {
            StoreError::Decode(format!("tree entry at offset {offset} has no mode separator"))
        })?;

        let mode = parse_mode(&head[..space], offset)?;
        let name = std::str::from_utf8(&head[space + 1..]).map_err(|_| {
            StoreError::Decode(format!("tree entry at offset {offset} has a non UTF-8 name"))
        })?;
        if name.is_empty() {
            return Err(StoreError::Decode(format!(
                "tree entry at offset {offset} has an empty name"
            )));
        }

        let id_bytes = &rest[nul + 1..];
        if id_bytes.len() < OBJECT_ID_LEN {
            return Err(StoreError::Decode(format!(
                "tree entry {name:?} has {} id bytes, need {OBJECT_ID_LEN}",
                id_bytes.len()
            )));
        }
        let object_id = ObjectId::from_slice(&id_bytes[..OBJECT_ID_LEN])
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        entries.push(TreeEntry::new(mode, name, object_id));
        rest = &id_bytes[OBJECT_ID_LEN..];
    }

    Ok(entries)
}

fn parse_mode(raw: &[u8], offset: usize) -> StoreResult<EntryMode> {
    let invalid = || {
        StoreError::Decode(format!(
            "tree entry at offset {offset} has invalid mode {:?}",
            String::from_utf8_lossy(raw)
        ))
    };
    if raw.is_empty() || !raw.iter().all(|b| (b'0'..=b'7').contains(b)) {
        return Err(invalid());
    }
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
    let bits = u32::from_str_radix(text, 8).map_err(|_| invalid())?;
    EntryMode::from_mode_bits(bits).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(mode: EntryMode, name: &str, byte: u8) -> TreeEntry {
        TreeEntry::new(mode, name, ObjectId::from_hash([byte; 20]))
    }

    #[test]
    fn encode_writes_header() {
        assert_eq!(encode(ObjectKind::Blob, b"hello\n"), b"blob 6\0hello\n");
        assert_eq!(encode(ObjectKind::Tree, b""), b"tree 0\0");
    }

    #[test]
    fn decode_blob() {
        let obj = decode(b"blob 6\0hello\n").unwrap();
        assert_eq!(obj.kind, ObjectKind::Blob);
        assert_eq!(obj.payload, b"hello\n");
    }

    #[test]
    fn payload_may_contain_nul() {
        let obj = decode(&encode(ObjectKind::Blob, b"a\0b\0")).unwrap();
        assert_eq!(obj.payload, b"a\0b\0");
    }

    #[test]
    fn decode_commit_is_recognised() {
        let obj = decode(b"commit 3\0abc").unwrap();
        assert_eq!(obj.kind, ObjectKind::Commit);
    }

    #[test]
    fn missing_nul_is_decode_error() {
        let err = decode(b"blob 6 hello\n").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn header_without_space_is_decode_error() {
        assert!(matches!(decode(b"blob6\0hello\n"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn header_with_three_tokens_is_decode_error() {
        assert!(matches!(decode(b"blob 6 x\0hello\n"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn non_decimal_length_is_decode_error() {
        assert!(matches!(decode(b"blob +6\0hello\n"), Err(StoreError::Decode(_))));
        assert!(matches!(decode(b"blob \0"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn length_mismatch_is_decode_error() {
        let err = decode(b"blob 7\0hello\n").unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn unknown_type_is_reported() {
        let err = decode(b"tag 0\0").unwrap_err();
        assert!(matches!(err, StoreError::UnknownObjectType(t) if t == "tag"));
    }

    #[test]
    fn tree_payload_layout() {
        let payload = encode_tree_entries(&[entry(EntryMode::Directory, "sub", 0xab)]);
        let mut expected = b"40000 sub\0".to_vec();
        expected.extend_from_slice(&[0xab; 20]);
        assert_eq!(payload, expected);
    }

    #[test]
    fn empty_tree_payload() {
        assert!(encode_tree_entries(&[]).is_empty());
        assert!(decode_tree_entries(b"").unwrap().is_empty());
    }

    #[test]
    fn names_with_spaces_survive() {
        let entries = vec![entry(EntryMode::Regular, "my file.txt", 1)];
        let decoded = decode_tree_entries(&encode_tree_entries(&entries)).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn zero_padded_mode_is_accepted() {
        let mut payload = b"040000 sub\0".to_vec();
        payload.extend_from_slice(&[1; 20]);
        let decoded = decode_tree_entries(&payload).unwrap();
        assert_eq!(decoded[0].mode, EntryMode::Directory);
    }

    #[test]
    fn truncated_id_is_decode_error() {
        let mut payload = b"100644 a.txt\0".to_vec();
        payload.extend_from_slice(&[1; 19]);
        let err = decode_tree_entries(&payload).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn missing_entry_nul_is_decode_error() {
        assert!(matches!(
            decode_tree_entries(b"100644 a.txt"),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn unknown_mode_is_decode_error() {
        let mut payload = b"100600 a.txt\0".to_vec();
        payload.extend_from_slice(&[1; 20]);
        assert!(matches!(decode_tree_entries(&payload), Err(StoreError::Decode(_))));
    }

    fn arb_entry() -> impl Strategy<Value = TreeEntry> {
        (
            prop_oneof![
                Just(EntryMode::Regular),
                Just(EntryMode::Executable),
                Just(EntryMode::Symlink),
                Just(EntryMode::Directory),
            ],
            "[^/\\x00]{1,24}",
            any::<[u8; 20]>(),
        )
            .prop_map(|(mode, name, id)| TreeEntry::new(mode, name, ObjectId::from_hash(id)))
    }

    proptest! {
        #[test]
        fn blob_encode_decode_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let decoded = decode(&encode(ObjectKind::Blob, &data)).unwrap();
            prop_assert_eq!(decoded, RawObject::new(ObjectKind::Blob, data));
        }

        #[test]
        fn tree_entries_roundtrip(entries in proptest::collection::vec(arb_entry(), 0..16)) {
            let decoded = decode_tree_entries(&encode_tree_entries(&entries)).unwrap();
            prop_assert_eq!(decoded, entries);
        }
    }
}
