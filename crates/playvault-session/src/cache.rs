//! The session cache: which token pairs are currently live, per user.
//!
//! Tokens are self-contained signed artifacts; once handed out they can't
//! be recalled. What CAN be recalled is this cache entry. Every
//! verification re-checks membership here, so removing an entry is how a
//! session is revoked (single-session eviction, logout, refresh rotation,
//! bans).
//!
//! # Concurrency note
//!
//! Unlike a per-connection registry owned by one task, this cache is hit
//! by every request concurrently. One mutex guards the whole map and
//! every operation is a single critical section, which makes mutations
//! for the same user linearizable. No lock is ever held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use playvault_store::UserId;

use crate::{SessionEntry, SessionError};

/// Registry of live sessions.
///
/// The issuer and verifiers depend on this trait rather than on
/// [`LocalSessionCache`], so a distributed implementation can be swapped in.
pub trait SessionCache: Send + Sync + 'static {
    /// Registers a session alongside the user's existing ones.
    ///
    /// # Errors
    /// [`SessionError::CacheUnavailable`] if the entry can't be recorded.
    fn add(&self, user_id: UserId, entry: &SessionEntry) -> Result<(), SessionError>;

    /// Atomically evicts every session of the user, then registers `entry`.
    ///
    /// Eviction and registration happen under one lock: the new entry can
    /// never be wiped by its own eviction, and of several concurrent
    /// `replace` calls for one user exactly one entry survives.
    fn replace(&self, user_id: UserId, entry: &SessionEntry) -> Result<(), SessionError>;

    /// Removes one session. Returns `true` if it was present.
    fn remove(&self, user_id: UserId, session_id: &str, refresh_session_id: &str) -> bool;

    /// Removes every session of the user.
    fn remove_all(&self, user_id: UserId);

    /// `true` if the access token `(session_id, expiry)` is live.
    fn is_valid_session(&self, user_id: UserId, expiry: i64, session_id: &str) -> bool;

    /// `true` if the refresh token `(refresh_session_id, expiry)` is live.
    fn is_valid_refresh(&self, user_id: UserId, expiry: i64, refresh_session_id: &str) -> bool;

    /// Administrative eviction of every session of the given users.
    fn ban(&self, user_ids: &[UserId]) {
        for user_id in user_ids {
            self.remove_all(*user_id);
        }
    }
}

/// Live token ids of one user, each mapped to its expiry.
#[derive(Debug, Default)]
struct UserSessions {
    sessions: HashMap<String, i64>,
    refreshes: HashMap<String, i64>,
}

impl UserSessions {
    fn insert(&mut self, entry: &SessionEntry) {
        self.sessions
            .insert(entry.session_id.clone(), entry.access_expiry);
        self.refreshes
            .insert(entry.refresh_session_id.clone(), entry.refresh_expiry);
    }

    fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.refreshes.is_empty()
    }
}

/// In-process [`SessionCache`].
///
/// ## Lifecycle
///
/// ```text
/// add()/replace() ──→ [live] ──→ remove()/remove_all()/ban()
///                        │
///                        ▼ (expiry passes)
///                 [stale: never validates] ──→ prune_expired()
/// ```
///
/// Stale entries are rejected by `is_valid_*` as soon as their expiry
/// passes; pruning only reclaims memory.
#[derive(Debug, Default)]
pub struct LocalSessionCache {
    users: Mutex<HashMap<UserId, UserSessions>>,
    closed: AtomicBool,
}

impl LocalSessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops accepting registrations. Verification keeps working, so
    /// in-flight requests can finish during shutdown.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!("session cache closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Drops every token id whose expiry is before `now`, and users left
    /// with nothing. Returns how many users were dropped entirely.
    pub fn prune_expired(&self, now: i64) -> usize {
        let mut users = self.users.lock();
        let before = users.len();
        users.retain(|_, user| {
            user.sessions.retain(|_, exp| *exp >= now);
            user.refreshes.retain(|_, exp| *exp >= now);
            !user.is_empty()
        });
        before - users.len()
    }

    /// Prunes periodically on a background task until the cache is closed.
    pub fn spawn_pruner(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if cache.is_closed() {
                    break;
                }
                let dropped = cache.prune_expired(now());
                if dropped > 0 {
                    tracing::debug!(dropped, "pruned expired sessions");
                }
            }
        })
    }

    /// Number of users with at least one entry (live or not yet pruned).
    pub fn user_count(&self) -> usize {
        self.users.lock().len()
    }

    /// Number of access-token entries held for `user_id`.
    pub fn session_count(&self, user_id: UserId) -> usize {
        self.users
            .lock()
            .get(&user_id)
            .map_or(0, |user| user.sessions.len())
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::CacheUnavailable("cache is closed".into()));
        }
        Ok(())
    }
}

/// Current unix time in seconds.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Looks up `id` in `tokens` and checks it is recorded with `expiry`,
/// which must not have passed at `now`.
///
/// A token is still accepted in the second of its `exp`, the same as the
/// signature check does with zero leeway.
fn is_live(tokens: &HashMap<String, i64>, id: &str, expiry: i64, now: i64) -> bool {
    tokens.get(id).is_some_and(|exp| *exp == expiry && expiry >= now)
}

impl SessionCache for LocalSessionCache {
    fn add(&self, user_id: UserId, entry: &SessionEntry) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.users.lock().entry(user_id).or_default().insert(entry);
        tracing::debug!(%user_id, session_id = %entry.session_id, "session added");
        Ok(())
    }

    fn replace(&self, user_id: UserId, entry: &SessionEntry) -> Result<(), SessionError> {
        self.ensure_open()?;
        let mut fresh = UserSessions::default();
        fresh.insert(entry);
        let evicted = self
            .users
            .lock()
            .insert(user_id, fresh)
            .map_or(0, |old| old.sessions.len());
        tracing::debug!(%user_id, session_id = %entry.session_id, evicted, "session replaced");
        Ok(())
    }

    fn remove(&self, user_id: UserId, session_id: &str, refresh_session_id: &str) -> bool {
        let mut users = self.users.lock();
        let Some(user) = users.get_mut(&user_id) else {
            return false;
        };
        let had_session = user.sessions.remove(session_id).is_some();
        let had_refresh = user.refreshes.remove(refresh_session_id).is_some();
        if user.is_empty() {
            users.remove(&user_id);
        }
        had_session || had_refresh
    }

    fn remove_all(&self, user_id: UserId) {
        if self.users.lock().remove(&user_id).is_some() {
            tracing::debug!(%user_id, "all sessions removed");
        }
    }

    fn is_valid_session(&self, user_id: UserId, expiry: i64, session_id: &str) -> bool {
        self.users
            .lock()
            .get(&user_id)
            .is_some_and(|user| is_live(&user.sessions, session_id, expiry, now()))
    }

    fn is_valid_refresh(&self, user_id: UserId, expiry: i64, refresh_session_id: &str) -> bool {
        self.users
            .lock()
            .get(&user_id)
            .is_some_and(|user| is_live(&user.refreshes, refresh_session_id, expiry, now()))
    }
}

// =========================================================================
// Tests
// =========================================================================
