use ogit_types::ObjectId;

use crate::codec;
use crate::error::StoreResult;
use crate::object::RawObject;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - The id is computed from the uncompressed canonical encoding, before
///   anything is written.
/// - Objects are immutable once written; writing the same content again
///   returns the same id and leaves the stored bytes unchanged.
/// - Errors are returned to the caller, never logged and swallowed.
pub trait ObjectStore: Send + Sync {
    /// Store a canonical encoding and return its id.
    fn put(&self, encoded: &[u8]) -> StoreResult<ObjectId>;

    /// Fetch the canonical encoding stored under `id`.
    ///
    /// Returns `StoreError::ObjectNotFound` if there is no such object.
    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether an object exists in the store.
    fn contains(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Encode and store an object.
    fn write(&self, object: &RawObject) -> StoreResult<ObjectId> {
        self.put(&object.encode())
    }

    /// Fetch and decode an object.
    fn read(&self, id: &ObjectId) -> StoreResult<RawObject> {
        codec::decode(&self.get(id)?)
    }
}
