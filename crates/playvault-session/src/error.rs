//! Error types for the session layer.

use playvault_store::UserId;

/// Errors that can occur while issuing, verifying or refreshing sessions.
///
/// These cover the full lifecycle of a session: registration in the
/// cache, token signing, and later verification.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session cache refused the registration (e.g. it was closed
    /// during shutdown). Issuance fails closed: a token whose session
    /// isn't in the cache could never be verified.
    #[error("session cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Signing a token failed.
    #[error("token signing failed: {0}")]
    Token(String),

    /// The token is malformed or its signature doesn't check out.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token's own expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token is well-formed and unexpired, but its session is no
    /// longer in the cache (evicted, logged out, rotated or banned).
    #[error("session revoked for user {0}")]
    Revoked(UserId),
}
