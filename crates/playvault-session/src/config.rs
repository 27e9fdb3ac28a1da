//! Session types: configuration, cache entries and issued credentials.
//!
//! A "session" is the server's record of one issued credential pair. It
//! tracks:
//! - WHO it belongs to (`UserId`)
//! - WHICH token pair it is (a session id embedded in both tokens)
//! - WHEN each token stops being valid (access and refresh expiries)

use playvault_store::UserId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Default access-token lifetime: one hour.
pub const DEFAULT_TOKEN_EXPIRY_SEC: i64 = 3600;

/// Default refresh-token lifetime: thirty days.
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_SEC: i64 = 30 * 24 * 3600;

/// Default period of the expired-session sweep: one minute.
pub const DEFAULT_PRUNE_INTERVAL_SEC: u64 = 60;

/// Configuration for session issuance.
///
/// Every field has a default, so a config file only needs to mention the
/// ones it overrides. The keys MUST be overridden in production.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC key for access tokens.
    pub encryption_key: String,

    /// HMAC key for refresh tokens. Distinct from `encryption_key` so a
    /// refresh token can never be presented as an access token.
    pub refresh_encryption_key: String,

    /// Access-token lifetime in seconds.
    pub token_expiry_sec: i64,

    /// Refresh-token lifetime in seconds.
    pub refresh_token_expiry_sec: i64,

    /// When set, issuing a session evicts every earlier session of the
    /// same user.
    pub single_session: bool,

    /// Seconds between sweeps of expired cache entries. `0` disables the
    /// background sweep.
    pub prune_interval_sec: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            encryption_key: "defaultencryptionkey".to_string(),
            refresh_encryption_key: "defaultrefreshencryptionkey".to_string(),
            token_expiry_sec: DEFAULT_TOKEN_EXPIRY_SEC,
            refresh_token_expiry_sec: DEFAULT_REFRESH_TOKEN_EXPIRY_SEC,
            single_session: true,
            prune_interval_sec: DEFAULT_PRUNE_INTERVAL_SEC,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionEntry
// ---------------------------------------------------------------------------

/// What the session cache remembers about one issued token pair.
///
/// Expiries are unix timestamps in seconds, exactly as embedded in the
/// tokens, so verification can compare them for equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    /// Id embedded in the access token.
    pub session_id: String,
    pub access_expiry: i64,
    /// Id embedded in the refresh token (the same as `session_id` for
    /// sessions minted by the issuer).
    pub refresh_session_id: String,
    pub refresh_expiry: i64,
}

// ---------------------------------------------------------------------------
// Issued credentials
// ---------------------------------------------------------------------------

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session id.
    pub tid: String,
    /// User id.
    pub uid: UserId,
    /// Username.
    pub usn: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

/// A freshly issued session, as returned by the issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub user_id: UserId,
    pub session_id: String,
    pub issued_at: i64,
    pub access_expiry: i64,
    pub refresh_expiry: i64,
    pub token: String,
    pub refresh_token: String,
}

impl IssuedSession {
    /// Hands the token pair to the caller.
    pub fn into_tokens(self, created: bool) -> SessionTokens {
        SessionTokens {
            token: self.token,
            refresh_token: self.refresh_token,
            created,
        }
    }
}

/// What an authentication call returns to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionTokens {
    pub token: String,
    pub refresh_token: String,
    /// `true` on the user's first authentication.
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.token_expiry_sec, 3600);
        assert_eq!(config.refresh_token_expiry_sec, 2_592_000);
        assert!(config.single_session);
        assert_eq!(config.prune_interval_sec, 60);
        assert_ne!(config.encryption_key, config.refresh_encryption_key);
    }

    #[test]
    fn test_session_config_partial_json_keeps_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"encryption_key":"k1","single_session":false}"#).unwrap();
        assert_eq!(config.encryption_key, "k1");
        assert!(!config.single_session);
        assert_eq!(config.token_expiry_sec, DEFAULT_TOKEN_EXPIRY_SEC);
        assert_eq!(config.prune_interval_sec, DEFAULT_PRUNE_INTERVAL_SEC);
    }

    #[test]
    fn test_session_config_prune_interval_zero_disables_sweep() {
        let config: SessionConfig = serde_json::from_str(r#"{"prune_interval_sec":0}"#).unwrap();
        assert_eq!(config.prune_interval_sec, 0);
        assert!(config.single_session);
    }
}
