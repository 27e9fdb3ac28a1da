//! Unified error type for Playvault.

use playvault_features::FeatureError;
use playvault_identity::IdentityError;
use playvault_session::SessionError;
use playvault_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `playvault` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PlayvaultError {
    /// A storage-level error (unavailable, permission, corrupt, encode).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An identity-level error (provider rejection, network, binding).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A session-level error (cache, signing, invalid or revoked token).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A game feature failed underneath.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// The configuration couldn't be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PlayvaultError {
    /// `true` if the failure is on the caller's side: a bad, expired or
    /// revoked credential, or a code the provider rejected.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::Session(
                SessionError::InvalidToken(_) | SessionError::Expired | SessionError::Revoked(_)
            ) | Self::Identity(IdentityError::Provider { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use playvault_store::UserId;

    use super::*;

    #[test]
    fn test_from_store_error() {
        let err = StoreError::Unavailable("db down".into());
        let playvault_err: PlayvaultError = err.into();
        assert!(matches!(playvault_err, PlayvaultError::Store(_)));
        assert!(playvault_err.to_string().contains("db down"));
    }

    #[test]
    fn test_from_identity_error() {
        let err = IdentityError::AccountNotFound("openid-1".into());
        let playvault_err: PlayvaultError = err.into();
        assert!(matches!(playvault_err, PlayvaultError::Identity(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Revoked(UserId::new_v4());
        let playvault_err: PlayvaultError = err.into();
        assert!(matches!(playvault_err, PlayvaultError::Session(_)));
        assert!(playvault_err.is_unauthenticated());
    }

    #[test]
    fn test_from_feature_error() {
        let err = FeatureError::Store(StoreError::Unavailable("gone".into()));
        let playvault_err: PlayvaultError = err.into();
        assert!(matches!(playvault_err, PlayvaultError::Feature(_)));
        assert!(!playvault_err.is_unauthenticated());
    }

    #[test]
    fn test_cache_unavailable_is_not_unauthenticated() {
        let err: PlayvaultError = SessionError::CacheUnavailable("closed".into()).into();
        assert!(!err.is_unauthenticated());
    }
}
