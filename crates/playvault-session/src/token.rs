//! Token signing and verification.
//!
//! Both tokens are HS256 JWTs carrying [`SessionClaims`]. Access and
//! refresh tokens are signed with different keys, so a refresh token
//! never verifies as an access token and vice versa.
//!
//! A signature check alone proves a token was minted here and hasn't
//! expired. Whether its session is still live is the cache's call.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{SessionClaims, SessionConfig, SessionError};

/// Signs and verifies session tokens with the configured keys.
pub struct TokenSigner {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            access_encoding: EncodingKey::from_secret(config.encryption_key.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.encryption_key.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_encryption_key.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_encryption_key.as_bytes()),
            validation,
        }
    }

    pub fn sign_access(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        sign(claims, &self.access_encoding)
    }

    pub fn sign_refresh(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        sign(claims, &self.refresh_encoding)
    }

    /// Checks signature and expiry of an access token.
    ///
    /// # Errors
    /// [`SessionError::Expired`] once `exp` has passed,
    /// [`SessionError::InvalidToken`] for anything else that fails.
    pub fn verify_access(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.verify(token, &self.access_decoding)
    }

    /// Same as [`verify_access`](Self::verify_access), with the refresh key.
    pub fn verify_refresh(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.verify(token, &self.refresh_decoding)
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> Result<SessionClaims, SessionError> {
        jsonwebtoken::decode::<SessionClaims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

fn sign(claims: &SessionClaims, key: &EncodingKey) -> Result<String, SessionError> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| SessionError::Token(e.to_string()))
}
