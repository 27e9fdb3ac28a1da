//! Error types for the feature layer.

use playvault_identity::IdentityError;
use playvault_store::StoreError;

/// Errors that can occur while running a game feature.
///
/// Business rejections (an invalid gift code, an unknown invitee) are not
/// errors: features report them as outcome values. What ends up here is a
/// collaborator that failed underneath.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Loading or saving a document failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Looking up another player's account failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}
