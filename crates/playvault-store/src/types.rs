//! Core identity and storage-object types.
//!
//! These are the values that cross the boundary between the typed
//! document world (feature records) and the untyped storage collaborator
//! (collection + key + owner → string).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over a 128-bit UUID so that a user id can't be confused with a
/// session id or any other UUID floating around. Created once per external
/// identity (see the identity binding) and immutable afterwards.
///
/// `#[serde(transparent)]` stores it as the plain UUID string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generates a fresh random (v4) user id.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses the canonical hyphenated form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a stored object belongs to.
///
/// Most documents are per-player. A few (template tables such as the
/// gift-code redemption table) are shared by everyone and have no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Shared document, not owned by any player.
    Global,
    /// Document owned by one player.
    User(UserId),
}

impl Owner {
    /// Returns the owning user, if any.
    pub fn user(&self) -> Option<UserId> {
        match self {
            Self::Global => None,
            Self::User(id) => Some(*id),
        }
    }
}

impl From<UserId> for Owner {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::User(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// Who may read a stored object from a client-facing (non-authoritative) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadPermission {
    /// Only authoritative (server) reads.
    NoRead = 0,
    /// The owner and the server.
    OwnerRead = 1,
    /// Everyone.
    PublicRead = 2,
}

/// Who may write a stored object from a client-facing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WritePermission {
    /// Only authoritative (server) writes.
    NoWrite = 0,
    /// The owner and the server.
    OwnerWrite = 1,
}

// ---------------------------------------------------------------------------
// Storage objects
// ---------------------------------------------------------------------------

/// Address of one stored object: `(collection, key, owner)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId {
    pub collection: String,
    pub key: String,
    pub owner: Owner,
}

impl ObjectId {
    pub fn new(collection: impl Into<String>, key: impl Into<String>, owner: Owner) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
            owner,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.collection, self.key, self.owner)
    }
}

/// An object as returned by a storage read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub id: ObjectId,
    /// Opaque payload; the document store treats it as a serialized record.
    pub value: String,
    pub read: ReadPermission,
    pub write: WritePermission,
}

/// One object to write. Writes are unconditional overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectWrite {
    pub id: ObjectId,
    pub value: String,
    pub read: ReadPermission,
    pub write: WritePermission,
}
