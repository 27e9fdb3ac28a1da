//! The document store gateway: typed records on top of untyped storage.
//!
//! Every feature follows the same lifecycle:
//!
//! ```text
//! load (or initialize) ──→ validate / mutate ──→ save (whole record)
//! ```
//!
//! The gateway issues exactly one storage read per load and one storage
//! write per save. It does not order concurrent load-mutate-save sequences
//! for the same document: the last writer wins.

use crate::{
    Codec, Document, JsonCodec, ObjectId, ObjectWrite, Owner, ReadPermission, StorageBackend,
    StoreError, UserId, WritePermission,
};

/// Permissions stamped on every document the gateway saves.
///
/// Owner-readable, but not writable from a client: all writes must go
/// through [`DocumentStore::save`] so server-side validation can't be
/// bypassed.
const DOCUMENT_READ: ReadPermission = ReadPermission::OwnerRead;
const DOCUMENT_WRITE: WritePermission = WritePermission::NoWrite;

/// Loads and saves [`Document`]s through a [`StorageBackend`].
pub struct DocumentStore<S: StorageBackend, C: Codec = JsonCodec> {
    backend: S,
    codec: C,
}

impl<S: StorageBackend> DocumentStore<S> {
    /// Creates a gateway using the JSON codec.
    pub fn new(backend: S) -> Self {
        Self::with_codec(backend, JsonCodec)
    }
}

impl<S: StorageBackend, C: Codec> DocumentStore<S, C> {
    pub fn with_codec(backend: S, codec: C) -> Self {
        Self { backend, codec }
    }

    /// The underlying storage collaborator.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads `owner`'s copy of `D` into `record`.
    ///
    /// - Absent → `record.initialize()`, `Ok(())`.
    /// - Present → the stored payload replaces `record`.
    ///
    /// # Errors
    /// - [`StoreError::Unavailable`] if the read fails.
    /// - [`StoreError::Corrupt`] if the stored payload doesn't decode.
    pub async fn load_into<D: Document>(
        &self,
        owner: UserId,
        record: &mut D,
    ) -> Result<(), StoreError> {
        self.read_document(Some(owner), Owner::User(owner), record).await
    }

    /// Loads `owner`'s copy of `D`, initialized if it was never saved.
    pub async fn load<D: Document + Default>(&self, owner: UserId) -> Result<D, StoreError> {
        let mut record = D::default();
        self.load_into(owner, &mut record).await?;
        Ok(record)
    }

    /// Saves `record` as `owner`'s copy of `D`, replacing it wholesale.
    ///
    /// # Errors
    /// - [`StoreError::Encode`] if the record can't be serialized (nothing
    ///   is written in that case).
    /// - [`StoreError::Unavailable`] if the write fails.
    pub async fn save<D: Document>(&self, owner: UserId, record: &D) -> Result<(), StoreError> {
        self.write_document(Owner::User(owner), record).await
    }

    /// Loads the shared (owner-less) copy of `D`.
    pub async fn load_global<D: Document + Default>(&self) -> Result<D, StoreError> {
        let mut record = D::default();
        self.read_document(None, Owner::Global, &mut record).await?;
        Ok(record)
    }

    /// Saves the shared (owner-less) copy of `D`.
    pub async fn save_global<D: Document>(&self, record: &D) -> Result<(), StoreError> {
        self.write_document(Owner::Global, record).await
    }

    /// Reads the raw stored value of a global object, if present.
    ///
    /// Used for data whose shape isn't a [`Document`], like template tables
    /// keyed by name.
    pub async fn read_raw(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let id = ObjectId::new(collection, key, Owner::Global);
        let mut objects = self.backend.read_objects(None, &[id]).await?;
        Ok(objects.pop().map(|object| object.value))
    }

    async fn read_document<D: Document>(
        &self,
        caller: Option<UserId>,
        owner: Owner,
        record: &mut D,
    ) -> Result<(), StoreError> {
        let (collection, key) = D::identity();
        let id = ObjectId::new(collection, key, owner);

        let mut objects = match self.backend.read_objects(caller, &[id]).await {
            Ok(objects) => objects,
            Err(e) => {
                tracing::error!(collection, key, %owner, error = %e, "document read failed");
                return Err(e);
            }
        };

        let Some(object) = objects.pop() else {
            tracing::debug!(collection, key, %owner, "document absent, initializing");
            record.initialize();
            return Ok(());
        };

        *record = self.codec.decode(&object.value).map_err(|source| {
            tracing::error!(collection, key, %owner, error = %source, "document corrupt");
            StoreError::Corrupt {
                collection: collection.to_string(),
                key: key.to_string(),
                source: source.into(),
            }
        })?;
        Ok(())
    }

    async fn write_document<D: Document>(
        &self,
        owner: Owner,
        record: &D,
    ) -> Result<(), StoreError> {
        let (collection, key) = D::identity();

        let value = self.codec.encode(record).map_err(|source| {
            tracing::error!(collection, key, %owner, error = %source, "document encode failed");
            StoreError::Encode {
                collection,
                key,
                source: source.into(),
            }
        })?;

        let write = ObjectWrite {
            id: ObjectId::new(collection, key, owner),
            value,
            read: DOCUMENT_READ,
            write: DOCUMENT_WRITE,
        };

        // Authoritative write: the object is locked for clients, not for us.
        if let Err(e) = self.backend.write_objects(None, &[write]).await {
            tracing::error!(collection, key, %owner, error = %e, "document write failed");
            return Err(e);
        }
        tracing::debug!(collection, key, %owner, "document saved");
        Ok(())
    }
}
