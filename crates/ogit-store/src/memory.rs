use std::collections::HashMap;
use std::sync::RwLock;

use ogit_crypto::ContentHasher;
use ogit_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Holds canonical encodings
/// (uncompressed) behind a `RwLock`.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, encoded: &[u8]) -> StoreResult<ObjectId> {
        let id = ContentHasher::digest(encoded);
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| encoded.to_vec());
        Ok(id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::ObjectNotFound(*id))
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
