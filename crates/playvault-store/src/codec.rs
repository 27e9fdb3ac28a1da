//! Codec trait and implementations for document payloads.
//!
//! The storage collaborator stores every document value as an opaque
//! string. A "codec" converts between a typed record and that string.
//! The gateway doesn't care HOW records are serialized; it just needs
//! something that implements [`Codec`].
//!
//! Currently we provide [`JsonCodec`], which matches what the stored
//! documents already look like (small JSON objects).

use serde::{Serialize, de::DeserializeOwned};

/// A codec failure once the gateway has taken it over.
///
/// Each codec reports its own [`Codec::Error`]; the gateway boxes it into
/// [`StoreError::Encode`](crate::StoreError) or
/// [`StoreError::Corrupt`](crate::StoreError) together with the collection
/// and key of the record involved.
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A codec that can encode Rust types to a stored value and decode back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the gateway is shared between request tasks, so the
///   codec it owns must be too.
/// - `'static` → the codec owns everything it needs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded record
/// doesn't borrow from the stored string, so the string can be dropped
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// What this codec reports when a value doesn't fit its format.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serializes a value into its stored string form.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, Self::Error>;

    /// Deserializes a stored string back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, Self::Error>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use playvault_store::{Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let stored = codec.encode(&vec![1, 2, 3]).unwrap();
/// assert_eq!(stored, "[1,2,3]");
///
/// let back: Vec<u32> = codec.decode(&stored).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    type Error = serde_json::Error;

    fn encode<T: Serialize>(&self, value: &T) -> Result<String, Self::Error> {
        serde_json::to_string(value)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, Self::Error> {
        serde_json::from_str(data)
    }
}
