//! Error types for the document store.
//!
//! Every failure the store can surface falls in one of two families:
//! the storage collaborator could not do its job ([`StoreError::Unavailable`],
//! [`StoreError::PermissionDenied`]), or a document could not be converted
//! to or from its stored form ([`StoreError::Encode`], [`StoreError::Corrupt`]).

use crate::CodecError;

/// Errors that can occur while loading or saving documents.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl;
/// the `#[error("...")]` attributes are the messages that show up in logs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage collaborator could not complete a read or write.
    ///
    /// Transient from the caller's point of view: nothing was committed,
    /// and retrying is the caller's decision.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A non-authoritative caller tried to touch an object it may not write.
    #[error("permission denied on {collection}/{key}")]
    PermissionDenied { collection: String, key: String },

    /// A record could not be serialized into its stored form.
    #[error("encode failed for {collection}/{key}: {source}")]
    Encode {
        collection: &'static str,
        key: &'static str,
        source: CodecError,
    },

    /// A stored payload exists but does not decode into the expected type.
    ///
    /// This is never treated as "absent": silently re-initializing would
    /// look exactly like a brand-new player and hide the data loss.
    #[error("corrupt document {collection}/{key}: {source}")]
    Corrupt {
        collection: String,
        key: String,
        source: CodecError,
    },
}
