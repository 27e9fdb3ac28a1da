//! External identity resolution and account binding for Playvault.
//!
//! 1. **Resolution**: a provider-issued one-time code is exchanged for a
//!    stable external id ([`IdentityProvider`], [`WeChatProvider`],
//!    [`TikTokProvider`]).
//! 2. **Binding**: the external id is mapped to an internal account,
//!    created on first sight ([`AccountStore`], [`MemoryAccounts`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Session layer (above)   ← issues tokens for the bound account
//!     ↕
//! Identity layer (this crate)
//!     ↕
//! Store layer (below)     ← provides UserId
//! ```

#![allow(async_fn_in_trait)]

mod binding;
mod error;
mod provider;
mod tiktok;
mod wechat;

pub use binding::{
    Account, AccountStore, Authenticated, MemoryAccounts, USERNAME_LEN, generate_username,
};
pub use error::IdentityError;
pub use provider::{
    DEFAULT_PROVIDER_TIMEOUT_SECS, ExternalId, IdentityProvider, ProviderCode, ProviderConfig,
};
pub use tiktok::{TIKTOK_ENDPOINT, TikTokProvider};
pub use wechat::{WECHAT_ENDPOINT, WeChatProvider};
