//! Session issuance for Playvault.
//!
//! 1. **Issuance**: minting an access/refresh token pair for a bound
//!    account ([`SessionIssuer`], [`TokenSigner`])
//! 2. **Session tracking**: knowing which token pairs are still live
//!    ([`SessionCache`], [`LocalSessionCache`])
//!
//! # How it fits in the stack
//!
//! ```text
//! API layer (above)      ← authenticates, then asks for a session
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Store layer (below)    ← provides UserId
//! ```

mod cache;
mod config;
mod error;
mod issuer;
mod token;

pub use cache::{LocalSessionCache, SessionCache};
pub use config::{
    DEFAULT_PRUNE_INTERVAL_SEC, DEFAULT_REFRESH_TOKEN_EXPIRY_SEC, DEFAULT_TOKEN_EXPIRY_SEC,
    IssuedSession, SessionClaims, SessionConfig, SessionEntry, SessionTokens,
};
pub use error::SessionError;
pub use issuer::SessionIssuer;
pub use token::TokenSigner;
