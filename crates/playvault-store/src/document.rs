//! The typed-document contract.
//!
//! Every feature record (feedback history, redeemed gift codes, invite
//! lists, progress) is just a Rust type implementing [`Document`]. The
//! [`DocumentStore`](crate::DocumentStore) can load and save any of them
//! without knowing their shape: the trait supplies the address, serde
//! supplies the payload.

use serde::{Serialize, de::DeserializeOwned};

/// A record that can be persisted through the document store.
///
/// # Addressing
///
/// `COLLECTION` and `KEY` are associated constants, so the address of a
/// document is a property of its TYPE, never of a particular value. The
/// owner is supplied per call.
///
/// # Example
///
/// ```rust
/// use playvault_store::Document;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Settings {
///     volume: u8,
/// }
///
/// impl Document for Settings {
///     const COLLECTION: &'static str = "user_data";
///     const KEY: &'static str = "settings";
///
///     fn initialize(&mut self) {
///         self.volume = 80;
///     }
/// }
///
/// assert_eq!(Settings::identity(), ("user_data", "settings"));
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Namespace the document lives in.
    const COLLECTION: &'static str;

    /// Key of the document, unique within collection + owner.
    const KEY: &'static str;

    /// Returns `(collection, key)`.
    fn identity() -> (&'static str, &'static str) {
        (Self::COLLECTION, Self::KEY)
    }

    /// Resets the record to its canonical empty state.
    ///
    /// The store calls this exactly when no persisted value exists yet.
    fn initialize(&mut self);
}
