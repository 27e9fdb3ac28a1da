//! `GameApi`: the game's RPC surface and the composition root.
//!
//! This is the entry point for a Playvault backend. It ties together all
//! the layers: identity → session → features → store. Transports (HTTP,
//! gRPC, ...) sit in front of it and only translate requests.

use std::sync::Arc;
use std::time::Duration;

use playvault_features::{
    ClaimOutcome, InviteOutcome, RedeemOutcome, RedemptionTable, claim_invite_reward,
    list_invitees, redeem_gift, submit_be_invited, submit_feedback,
};
use playvault_identity::{
    AccountStore, IdentityProvider, ProviderCode, TikTokProvider, WeChatProvider,
    generate_username,
};
use playvault_session::{LocalSessionCache, SessionIssuer, SessionTokens};
use playvault_store::{DocumentStore, StorageBackend, UserId};
use tokio::task::JoinHandle;

use crate::{PlayvaultError, ServerConfig};

/// Who is calling, established by [`GameApi::verify_session`].
///
/// Every feature RPC takes one explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub username: String,
    pub session_id: String,
    /// Access-token expiry (unix seconds).
    pub expires_at: i64,
}

/// Builder for configuring a [`GameApi`].
///
/// # Example
///
/// ```rust,no_run
/// use playvault::prelude::*;
///
/// # async fn run() -> Result<(), PlayvaultError> {
/// let config = ServerConfig::from_json_file("playvault.json")?;
/// let api = GameApiBuilder::new()
///     .config(config)
///     .build(MemoryStorage::new(), MemoryAccounts::new())
///     .await;
/// let tokens = api.authenticate_wechat("code-from-client").await?;
/// # Ok(())
/// # }
/// ```
pub struct GameApiBuilder {
    config: ServerConfig,
    cache: Option<Arc<LocalSessionCache>>,
    redemptions: Option<RedemptionTable>,
}

impl GameApiBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            cache: None,
            redemptions: None,
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing session cache instead of creating one.
    pub fn session_cache(mut self, cache: Arc<LocalSessionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Uses `table` instead of loading the redemption table.
    pub fn redemptions(mut self, table: RedemptionTable) -> Self {
        self.redemptions = Some(table);
        self
    }

    /// Builds the API over `storage` and `accounts`.
    ///
    /// Unless one was supplied, the redemption table is loaded here
    /// (storage first, then the data directory). When
    /// `session.prune_interval_sec` is non-zero, a tokio task starts
    /// sweeping expired sessions out of the cache at that period; it stops
    /// on [`GameApi::shutdown`] or when the `GameApi` is dropped.
    pub async fn build<S, A>(self, storage: S, accounts: A) -> GameApi<S, A>
    where
        S: StorageBackend,
        A: AccountStore,
    {
        let store = DocumentStore::new(storage);
        let redemptions = match self.redemptions {
            Some(table) => table,
            None => RedemptionTable::load(&store, &self.config.data_dir).await,
        };
        let cache: Arc<LocalSessionCache> = self.cache.unwrap_or_default();
        let pruner = match self.config.session.prune_interval_sec {
            0 => None,
            secs => Some(cache.spawn_pruner(Duration::from_secs(secs))),
        };
        let sessions = SessionIssuer::new(cache, self.config.session.clone());

        tracing::info!(
            single_session = self.config.session.single_session,
            prune_interval_sec = self.config.session.prune_interval_sec,
            redemptions = redemptions.len(),
            "game api ready"
        );
        GameApi {
            wechat: WeChatProvider::new(self.config.social.wechat.clone()),
            tiktok: TikTokProvider::new(self.config.social.tiktok.clone()),
            store,
            accounts,
            sessions,
            redemptions,
            pruner,
            config: self.config,
        }
    }
}

impl Default for GameApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The game backend: authentication plus every feature RPC.
///
/// Holds the only in-process mutable shared state, the session cache, in
/// an `Arc`. Wrap the whole `GameApi` in an `Arc` to share it between
/// request tasks.
pub struct GameApi<S: StorageBackend, A: AccountStore> {
    config: ServerConfig,
    store: DocumentStore<S>,
    accounts: A,
    sessions: SessionIssuer<LocalSessionCache>,
    wechat: WeChatProvider,
    tiktok: TikTokProvider,
    redemptions: RedemptionTable,
    pruner: Option<JoinHandle<()>>,
}

impl<S: StorageBackend, A: AccountStore> GameApi<S, A> {
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn session_cache(&self) -> &Arc<LocalSessionCache> {
        self.sessions.cache()
    }

    pub fn redemptions(&self) -> &RedemptionTable {
        &self.redemptions
    }

    /// `true` while the background session sweep is running.
    pub fn is_pruning(&self) -> bool {
        self.pruner.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops issuing sessions and ends the session sweep after its next
    /// tick. Tokens already out keep verifying until they expire.
    pub fn shutdown(&self) {
        self.session_cache().close();
    }

    // -- Authentication ---------------------------------------------------

    /// Signs a player in with a WeChat mini-program login code.
    pub async fn authenticate_wechat(&self, code: &str) -> Result<SessionTokens, PlayvaultError> {
        self.authenticate(&self.wechat, &ProviderCode::new(code)).await
    }

    /// Signs a player in with a TikTok mini-game login code.
    pub async fn authenticate_tiktok(
        &self,
        code: &str,
        anonymous_code: Option<&str>,
    ) -> Result<SessionTokens, PlayvaultError> {
        let mut code = ProviderCode::new(code);
        if let Some(anonymous_code) = anonymous_code {
            code = code.with_anonymous_code(anonymous_code);
        }
        self.authenticate(&self.tiktok, &code).await
    }

    /// Resolve → bind → issue. Nothing is issued unless every step succeeds.
    async fn authenticate<P: IdentityProvider>(
        &self,
        provider: &P,
        code: &ProviderCode,
    ) -> Result<SessionTokens, PlayvaultError> {
        let external_id = provider.resolve(code).await.inspect_err(|e| {
            tracing::warn!(provider = provider.name(), error = %e, "code exchange failed");
        })?;

        let bound = self
            .accounts
            .authenticate_or_create(&external_id, &generate_username(), true)
            .await?;
        let account = bound.account;

        let session =
            self.sessions
                .issue(account.user_id, &account.username, self.config.session.single_session)?;

        tracing::info!(
            provider = provider.name(),
            user_id = %account.user_id,
            created = bound.created,
            "player authenticated"
        );
        Ok(session.into_tokens(bound.created))
    }

    /// Exchanges a refresh token for a new token pair. The old pair stops
    /// working.
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<SessionTokens, PlayvaultError> {
        Ok(self.sessions.refresh(refresh_token)?.into_tokens(false))
    }

    /// Checks an access token and returns who it belongs to.
    pub fn verify_session(&self, token: &str) -> Result<AuthContext, PlayvaultError> {
        let claims = self.sessions.verify_session(token)?;
        Ok(AuthContext {
            user_id: claims.uid,
            username: claims.usn,
            session_id: claims.tid,
            expires_at: claims.exp,
        })
    }

    /// Ends every session of the caller.
    pub fn logout(&self, ctx: &AuthContext) {
        self.sessions.logout(ctx.user_id);
    }

    // -- Features ---------------------------------------------------------

    pub async fn submit_feedback(
        &self,
        ctx: &AuthContext,
        description: &str,
        issues: i32,
    ) -> Result<(), PlayvaultError> {
        Ok(submit_feedback(&self.store, ctx.user_id, description, issues).await?)
    }

    pub async fn redeem_gift(
        &self,
        ctx: &AuthContext,
        gift_code: &str,
    ) -> Result<RedeemOutcome, PlayvaultError> {
        Ok(redeem_gift(&self.store, &self.redemptions, ctx.user_id, gift_code).await?)
    }

    pub async fn submit_be_invited(
        &self,
        ctx: &AuthContext,
        share_id: &str,
    ) -> Result<InviteOutcome, PlayvaultError> {
        Ok(submit_be_invited(&self.store, &self.accounts, ctx.user_id, &ctx.username, share_id)
            .await?)
    }

    pub async fn list_invitees(&self, ctx: &AuthContext) -> Result<Vec<String>, PlayvaultError> {
        Ok(list_invitees(&self.store, &self.accounts, ctx.user_id).await?)
    }

    pub async fn claim_invite_reward(
        &self,
        ctx: &AuthContext,
        invitees: &[String],
    ) -> Result<ClaimOutcome, PlayvaultError> {
        Ok(claim_invite_reward(&self.store, ctx.user_id, invitees).await?)
    }
}

impl<S: StorageBackend, A: AccountStore> Drop for GameApi<S, A> {
    fn drop(&mut self) {
        if let Some(pruner) = self.pruner.take() {
            pruner.abort();
        }
    }
}
