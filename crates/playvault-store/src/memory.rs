//! In-process [`StorageBackend`] backed by a hash map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::{
    ObjectId, ObjectWrite, ReadPermission, StorageBackend, StoreError, StoredObject, UserId,
    WritePermission,
};

/// A storage backend that keeps every object in memory.
///
/// Honors the same permission rules a real storage engine would, so code
/// tested against it behaves the same in production. It can also be put
/// "offline" to exercise storage-unavailable paths.
///
/// Lock sections never span an `.await`, which is why a synchronous
/// `parking_lot` lock is fine inside the async methods.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    offline: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read and write fail with
    /// [`StoreError::Unavailable`] (or succeed again with `false`).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory storage is offline".into()));
        }
        Ok(())
    }
}

/// Can `caller` read `object` from a client-facing call?
fn can_read(caller: UserId, object: &StoredObject) -> bool {
    match object.read {
        ReadPermission::PublicRead => true,
        ReadPermission::OwnerRead => object.id.owner.user() == Some(caller),
        ReadPermission::NoRead => false,
    }
}

impl StorageBackend for MemoryStorage {
    async fn read_objects(
        &self,
        caller: Option<UserId>,
        ids: &[ObjectId],
    ) -> Result<Vec<StoredObject>, StoreError> {
        self.check_online()?;

        let objects = self.objects.read();
        let found = ids
            .iter()
            .filter_map(|id| objects.get(id))
            .filter(|object| caller.is_none_or(|user| can_read(user, object)))
            .cloned()
            .collect();
        Ok(found)
    }

    async fn write_objects(
        &self,
        caller: Option<UserId>,
        writes: &[ObjectWrite],
    ) -> Result<(), StoreError> {
        self.check_online()?;

        let mut objects = self.objects.write();

        // Validate the whole batch before touching anything, so a rejected
        // batch leaves no partial writes behind.
        if let Some(user) = caller {
            for write in writes {
                let foreign = write.id.owner.user() != Some(user);
                let locked = objects
                    .get(&write.id)
                    .is_some_and(|existing| existing.write == WritePermission::NoWrite);
                if foreign || locked {
                    tracing::debug!(object = %write.id, %user, "client write rejected");
                    return Err(StoreError::PermissionDenied {
                        collection: write.id.collection.clone(),
                        key: write.id.key.clone(),
                    });
                }
            }
        }

        for write in writes {
            objects.insert(
                write.id.clone(),
                StoredObject {
                    id: write.id.clone(),
                    value: write.value.clone(),
                    read: write.read,
                    write: write.write,
                },
            );
        }
        Ok(())
    }
}
