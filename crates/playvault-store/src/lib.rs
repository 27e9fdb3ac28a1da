//! Per-user document store for Playvault.
//!
//! This crate defines how game features persist their state:
//!
//! - **Contract** ([`Document`]): a typed record with a static
//!   `(collection, key)` address and an "empty" state.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how records become the
//!   opaque strings the storage engine holds.
//! - **Gateway** ([`DocumentStore`]): load-or-initialize, then save the
//!   whole record back.
//! - **Collaborator** ([`StorageBackend`], [`MemoryStorage`]): the
//!   key/value engine underneath.
//!
//! # Architecture
//!
//! ```text
//! Feature handler → DocumentStore (typed) → StorageBackend (strings)
//! ```

#![allow(async_fn_in_trait)]

mod backend;
mod codec;
mod document;
mod error;
mod gateway;
mod memory;
mod types;

pub use backend::StorageBackend;
pub use codec::{Codec, CodecError, JsonCodec};
pub use document::Document;
pub use error::StoreError;
pub use gateway::DocumentStore;
pub use memory::MemoryStorage;
pub use types::{
    ObjectId, ObjectWrite, Owner, ReadPermission, StoredObject, UserId, WritePermission,
};
