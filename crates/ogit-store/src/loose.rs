use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ogit_crypto::ContentHasher;
use ogit_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::compress::{Compressor, DEFAULT_LEVEL};
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Stored objects are never rewritten, so their files are read-only.
#[cfg(unix)]
const OBJECT_FILE_MODE: u32 = 0o444;

/// Loose object store: one zlib-compressed file per object.
///
/// Objects live at `<objects_dir>/<id[0:2]>/<id[2:]>`. There is no cache;
/// every call goes to disk. New objects are written to a temporary file in
/// the fan-out directory and renamed into place, so a reader never sees a
/// partially written object and racing writers of the same content are
/// harmless.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compressor: Compressor,
}

impl LooseObjectStore {
    /// Create a store rooted at `objects_dir` with the default zlib level.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self::with_compression(objects_dir, DEFAULT_LEVEL)
    }

    /// Create a store rooted at `objects_dir` with a specific zlib level.
    pub fn with_compression(objects_dir: impl Into<PathBuf>, level: u32) -> Self {
        Self {
            objects_dir: objects_dir.into(),
            compressor: Compressor::new(level),
        }
    }

    /// The directory holding the fan-out subdirectories.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Path of the file that holds (or would hold) `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fanout();
        self.objects_dir.join(dir).join(file)
    }
}

impl ObjectStore for LooseObjectStore {
    fn put(&self, encoded: &[u8]) -> StoreResult<ObjectId> {
        let id = ContentHasher::digest(encoded);
        let path = self.object_path(&id);
        if path.is_file() {
            debug!(%id, "object already stored");
            return Ok(id);
        }

        let fanout_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.objects_dir.clone());
        fs::create_dir_all(&fanout_dir).map_err(|e| StoreError::io(&fanout_dir, e))?;

        let compressed = self
            .compressor
            .compress(encoded)
            .map_err(|e| StoreError::io(&path, e))?;
        let mut tmp = NamedTempFile::new_in(&fanout_dir).map_err(|e| StoreError::io(&fanout_dir, e))?;
        tmp.write_all(&compressed)
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(OBJECT_FILE_MODE))
                .map_err(|e| StoreError::io(tmp.path(), e))?;
        }

        match tmp.persist_noclobber(&path) {
            Ok(_) => {}
            // Another writer got there first with identical bytes.
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StoreError::io(&path, e.error)),
        }

        debug!(
            %id,
            size = encoded.len(),
            compressed = compressed.len(),
            "wrote loose object"
        );
        Ok(id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::ObjectNotFound(*id))
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        self.compressor
            .decompress(&compressed)
            .map_err(|e| StoreError::CorruptObject {
                id: *id,
                reason: e.to_string(),
            })
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        let path = self.object_path(id);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::object::{Blob, EntryMode, ObjectKind, RawObject, Tree, TreeEntry};

    fn temp_store() -> (tempfile::TempDir, LooseObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path().join("objects"));
        (dir, store)
    }

    #[test]
    fn put_writes_fanout_path() {
        let (_dir, store) = temp_store();
        let id = store.put(b"blob 6\0hello\n").unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");

        let path = store
            .objects_dir()
            .join("ce")
            .join("013625030ba8dba906f756967f9e9ca394464a");
        assert!(path.is_file());
        assert_eq!(store.object_path(&id), path);
    }

    #[test]
    fn stored_file_is_compressed_encoding() {
        let (_dir, store) = temp_store();
        let id = store.put(b"blob 6\0hello\n").unwrap();
        let on_disk = fs::read(store.object_path(&id)).unwrap();
        assert_ne!(on_disk, b"blob 6\0hello\n");
        assert_eq!(
            Compressor::default().decompress(&on_disk).unwrap(),
            b"blob 6\0hello\n"
        );
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, store) = temp_store();
        let encoded = codec::encode(ObjectKind::Blob, b"some content");
        let id = store.put(&encoded).unwrap();
        assert_eq!(store.get(&id).unwrap(), encoded);
    }

    #[test]
    fn put_is_idempotent() {
        let (_dir, store) = temp_store();
        let id1 = store.put(b"blob 1\0x").unwrap();
        let before = fs::read(store.object_path(&id1)).unwrap();
        let id2 = store.put(b"blob 1\0x").unwrap();
        let after = fs::read(store.object_path(&id2)).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[test]
    fn object_files_are_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        let id = store.put(b"blob 1\0x").unwrap();
        let mode = fs::metadata(store.object_path(&id)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
        assert_eq!(store.get(&id).unwrap(), b"blob 1\0x");
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (_dir, store) = temp_store();
        let id = store.put(b"blob 1\0x").unwrap();
        store.put(b"blob 1\0x").unwrap();
        let fanout = store.object_path(&id).parent().unwrap().to_path_buf();
        assert_eq!(fs::read_dir(fanout).unwrap().count(), 1);
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_hash([9; 20]);
        assert!(matches!(store.get(&id), Err(StoreError::ObjectNotFound(x)) if x == id));
        assert!(!store.contains(&id).unwrap());
    }

    #[test]
    fn contains_after_put() {
        let (_dir, store) = temp_store();
        let id = store.put(b"blob 0\0").unwrap();
        assert!(store.contains(&id).unwrap());
    }

    #[test]
    fn corrupt_file_is_corrupt_object() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_hash([7; 20]);
        let path = store.object_path(&id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"definitely not zlib").unwrap();
        assert!(matches!(
            store.get(&id),
            Err(StoreError::CorruptObject { id: x, .. }) if x == id
        ));
    }

    #[test]
    fn header_without_nul_is_decode_error() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_hash([5; 20]);
        let path = store.object_path(&id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, Compressor::default().compress(b"blob 5 hello").unwrap()).unwrap();
        assert!(matches!(store.read(&id), Err(StoreError::Decode(_))));
    }

    #[test]
    fn write_and_read_objects() {
        let (_dir, store) = temp_store();
        let blob_id = store
            .write(&Blob::new(b"x".to_vec()).into_raw_object())
            .unwrap();
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::Regular, "a.txt", blob_id)]);
        let tree_id = store.write(&tree.to_raw_object().unwrap()).unwrap();

        let raw = store.read(&tree_id).unwrap();
        assert_eq!(raw.kind, ObjectKind::Tree);
        assert_eq!(Tree::from_raw_object(&raw).unwrap(), tree);
        assert_eq!(
            store.read(&blob_id).unwrap(),
            RawObject::new(ObjectKind::Blob, b"x".to_vec())
        );
    }

    #[test]
    fn compression_level_does_not_change_id() {
        let dir = tempfile::tempdir().unwrap();
        let fast = LooseObjectStore::with_compression(dir.path().join("a"), 1);
        let best = LooseObjectStore::with_compression(dir.path().join("b"), 9);
        let encoded = codec::encode(ObjectKind::Blob, &[b'z'; 1000]);
        assert_eq!(fast.put(&encoded).unwrap(), best.put(&encoded).unwrap());
    }
}
