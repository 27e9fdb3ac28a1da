//! # Playvault
//!
//! Session issuance and per-player documents for mini-game backends.
//!
//! A player signs in with a one-time code from their platform (WeChat,
//! TikTok); Playvault exchanges it for the platform's stable id, binds
//! that to an account (creating it on first sight) and issues an
//! access/refresh token pair. Every later call presents the access token,
//! and game features read and write the player's documents.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playvault::prelude::*;
//!
//! # async fn run() -> Result<(), PlayvaultError> {
//! playvault::init_tracing();
//!
//! let api = GameApiBuilder::new()
//!     .config(ServerConfig::from_json_file("playvault.json")?)
//!     .build(MemoryStorage::new(), MemoryAccounts::new())
//!     .await;
//!
//! let tokens = api.authenticate_wechat("code-from-client").await?;
//! let ctx = api.verify_session(&tokens.token)?;
//! let outcome = api.redeem_gift(&ctx, "WELCOME").await?;
//! println!("{}: {}", outcome.code(), outcome.message());
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod error;

pub use api::{AuthContext, GameApi, GameApiBuilder};
pub use config::{ServerConfig, SocialConfig};
pub use error::PlayvaultError;

/// Installs a `tracing` subscriber that logs to stdout.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling it
/// again (or after another subscriber was installed) does nothing.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    pub use crate::{AuthContext, GameApi, GameApiBuilder, PlayvaultError, ServerConfig};
    pub use playvault_features::{ClaimOutcome, InviteOutcome, RedeemOutcome, RedemptionTable};
    pub use playvault_identity::{AccountStore, MemoryAccounts, ProviderConfig};
    pub use playvault_session::{SessionConfig, SessionTokens};
    pub use playvault_store::{Document, DocumentStore, MemoryStorage, StorageBackend, UserId};
}
