//! The storage collaborator the document store is built on.
//!
//! Playvault doesn't implement a storage engine. It consumes one through
//! [`StorageBackend`]: a batch read and an unconditional batch write of
//! `(collection, key, owner) → string` objects. Production deployments
//! plug in their database here; tests and single-process setups use
//! [`MemoryStorage`](crate::MemoryStorage).

use std::future::Future;

use crate::{ObjectId, ObjectWrite, StoreError, StoredObject, UserId};

/// Key/value object storage with per-object permissions.
///
/// # The `caller` argument
///
/// - `None` → an authoritative (server) call. Permissions are not checked.
/// - `Some(user)` → a call made on behalf of a player. Reads only return
///   objects that player may read; writes fail with
///   [`StoreError::PermissionDenied`] on objects the player may not write.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so one backend can be shared by every request
/// task for the lifetime of the server.
pub trait StorageBackend: Send + Sync + 'static {
    /// Reads the requested objects.
    ///
    /// Returns zero or one object per requested id; missing objects are
    /// simply absent from the result, not an error.
    fn read_objects(
        &self,
        caller: Option<UserId>,
        ids: &[ObjectId],
    ) -> impl Future<Output = Result<Vec<StoredObject>, StoreError>> + Send;

    /// Writes the given objects, overwriting whatever was stored.
    ///
    /// No version check, no merge: last writer wins.
    fn write_objects(
        &self,
        caller: Option<UserId>,
        writes: &[ObjectWrite],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
