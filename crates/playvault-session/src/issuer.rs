//! Session issuance, verification and rotation.

use std::sync::Arc;

use playvault_store::UserId;
use uuid::Uuid;

use crate::cache::now;
use crate::{
    IssuedSession, SessionCache, SessionClaims, SessionConfig, SessionEntry, SessionError,
    TokenSigner,
};

/// Mints token pairs and keeps the session cache in step with them.
///
/// Shares its cache through an `Arc`, so the composition root can hand
/// the same cache to a pruner task or an admin surface.
#[derive(Debug)]
pub struct SessionIssuer<C: SessionCache> {
    cache: Arc<C>,
    signer: TokenSigner,
    config: SessionConfig,
}

impl<C: SessionCache> SessionIssuer<C> {
    pub fn new(cache: Arc<C>, config: SessionConfig) -> Self {
        Self {
            signer: TokenSigner::new(&config),
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issues a fresh session for `user_id`.
    ///
    /// Both tokens are signed before the cache is touched. With
    /// `single_session` set, every earlier session of the user is evicted
    /// in the same step the new one is registered.
    ///
    /// # Errors
    /// - [`SessionError::Token`] if signing fails. The cache is unchanged.
    /// - [`SessionError::CacheUnavailable`] if the cache refuses the entry.
    ///   The signed tokens are dropped and never reach the caller.
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        single_session: bool,
    ) -> Result<IssuedSession, SessionError> {
        let session_id = Uuid::new_v4().to_string();
        let issued_at = now();
        let access_expiry = issued_at + self.config.token_expiry_sec;
        let refresh_expiry = issued_at + self.config.refresh_token_expiry_sec;

        let claims = |exp| SessionClaims {
            tid: session_id.clone(),
            uid: user_id,
            usn: username.to_string(),
            iat: issued_at,
            exp,
        };
        let (token, refresh_token) = self
            .signer
            .sign_access(&claims(access_expiry))
            .and_then(|token| {
                self.signer
                    .sign_refresh(&claims(refresh_expiry))
                    .map(|refresh| (token, refresh))
            })
            .inspect_err(|e| tracing::error!(%user_id, error = %e, "session signing failed"))?;

        let entry = SessionEntry {
            session_id: session_id.clone(),
            access_expiry,
            refresh_session_id: session_id.clone(),
            refresh_expiry,
        };
        if single_session {
            self.cache.replace(user_id, &entry)?;
        } else {
            self.cache.add(user_id, &entry)?;
        }

        tracing::info!(%user_id, %session_id, single_session, "session issued");
        Ok(IssuedSession {
            user_id,
            session_id,
            issued_at,
            access_expiry,
            refresh_expiry,
            token,
            refresh_token,
        })
    }

    /// Verifies an access token and checks its session is still live.
    ///
    /// # Errors
    /// [`SessionError::Expired`] / [`SessionError::InvalidToken`] from the
    /// signature check, [`SessionError::Revoked`] when the session has left
    /// the cache.
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let claims = self.signer.verify_access(token)?;
        if !self.cache.is_valid_session(claims.uid, claims.exp, &claims.tid) {
            return Err(SessionError::Revoked(claims.uid));
        }
        Ok(claims)
    }

    /// Exchanges a live refresh token for a new session.
    ///
    /// The old session is consumed: of two concurrent refreshes with the
    /// same token, only one succeeds.
    pub fn refresh(&self, refresh_token: &str) -> Result<IssuedSession, SessionError> {
        let claims = self.signer.verify_refresh(refresh_token)?;
        if !self.cache.is_valid_refresh(claims.uid, claims.exp, &claims.tid) {
            return Err(SessionError::Revoked(claims.uid));
        }
        if !self.cache.remove(claims.uid, &claims.tid, &claims.tid) {
            return Err(SessionError::Revoked(claims.uid));
        }
        tracing::debug!(user_id = %claims.uid, session_id = %claims.tid, "session rotated");
        self.issue(claims.uid, &claims.usn, self.config.single_session)
    }

    /// Ends every session of the user.
    pub fn logout(&self, user_id: UserId) {
        self.cache.remove_all(user_id);
        tracing::info!(%user_id, "logged out");
    }
}

#[cfg(test)]
mod tests {
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use super::*;
    use crate::LocalSessionCache;

    fn issuer() -> SessionIssuer<LocalSessionCache> {
        SessionIssuer::new(Arc::new(LocalSessionCache::new()), SessionConfig::default())
    }

    /// A cache that refuses every registration.
    struct BrokenCache;

    impl SessionCache for BrokenCache {
        fn add(&self, _: UserId, _: &SessionEntry) -> Result<(), SessionError> {
            Err(SessionError::CacheUnavailable("down".into()))
        }
        fn replace(&self, _: UserId, _: &SessionEntry) -> Result<(), SessionError> {
            Err(SessionError::CacheUnavailable("down".into()))
        }
        fn remove(&self, _: UserId, _: &str, _: &str) -> bool {
            false
        }
        fn remove_all(&self, _: UserId) {}
        fn is_valid_session(&self, _: UserId, _: i64, _: &str) -> bool {
            false
        }
        fn is_valid_refresh(&self, _: UserId, _: i64, _: &str) -> bool {
            false
        }
    }

    /// A working cache whose `replace` can be switched off.
    #[derive(Default)]
    struct RefusingReplace {
        inner: LocalSessionCache,
        refuse: std::sync::atomic::AtomicBool,
    }

    impl SessionCache for RefusingReplace {
        fn add(&self, user_id: UserId, entry: &SessionEntry) -> Result<(), SessionError> {
            self.inner.add(user_id, entry)
        }
        fn replace(&self, user_id: UserId, entry: &SessionEntry) -> Result<(), SessionError> {
            if self.refuse.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(SessionError::CacheUnavailable("replace refused".into()));
            }
            self.inner.replace(user_id, entry)
        }
        fn remove(&self, user_id: UserId, session_id: &str, refresh_session_id: &str) -> bool {
            self.inner.remove(user_id, session_id, refresh_session_id)
        }
        fn remove_all(&self, user_id: UserId) {
            self.inner.remove_all(user_id);
        }
        fn is_valid_session(&self, user_id: UserId, expiry: i64, session_id: &str) -> bool {
            self.inner.is_valid_session(user_id, expiry, session_id)
        }
        fn is_valid_refresh(&self, user_id: UserId, expiry: i64, session_id: &str) -> bool {
            self.inner.is_valid_refresh(user_id, expiry, session_id)
        }
    }

    // =====================================================================
    // issue()
    // =====================================================================

    #[test]
    fn test_issue_sets_expiries_from_config() {
        let issuer = issuer();

        let session = issuer.issue(UserId::new_v4(), "player", true).unwrap();

        assert_eq!(session.access_expiry - session.issued_at, 3600);
        assert_eq!(session.refresh_expiry - session.issued_at, 2_592_000);
        assert_ne!(session.token, session.refresh_token);
    }

    #[test]
    fn test_issue_token_carries_session_claims() {
        let issuer = issuer();
        let user = UserId::new_v4();

        let session = issuer.issue(user, "player", true).unwrap();
        let claims = issuer.verify_session(&session.token).unwrap();

        assert_eq!(claims.uid, user);
        assert_eq!(claims.usn, "player");
        assert_eq!(claims.tid, session.session_id);
        assert_eq!(claims.exp, session.access_expiry);
    }

    #[test]
    fn test_issue_single_session_evicts_previous() {
        let issuer = issuer();
        let user = UserId::new_v4();

        let first = issuer.issue(user, "player", true).unwrap();
        let second = issuer.issue(user, "player", true).unwrap();

        assert!(matches!(
            issuer.verify_session(&first.token),
            Err(SessionError::Revoked(u)) if u == user
        ));
        assert!(issuer.verify_session(&second.token).is_ok());
        assert_eq!(issuer.cache().session_count(user), 1);
    }

    #[test]
    fn test_issue_without_single_session_keeps_previous() {
        let issuer = issuer();
        let user = UserId::new_v4();

        let first = issuer.issue(user, "player", false).unwrap();
        let second = issuer.issue(user, "player", false).unwrap();

        assert!(issuer.verify_session(&first.token).is_ok());
        assert!(issuer.verify_session(&second.token).is_ok());
    }

    #[test]
    fn test_issue_concurrent_single_session_leaves_one_entry() {
        let issuer = Arc::new(issuer());
        let user = UserId::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let issuer = Arc::clone(&issuer);
                std::thread::spawn(move || issuer.issue(user, "player", true).unwrap())
            })
            .collect();
        let sessions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(issuer.cache().session_count(user), 1);
        let live = sessions
            .iter()
            .filter(|s| issuer.verify_session(&s.token).is_ok())
            .count();
        assert_eq!(live, 1);
    }

    #[test]
    fn test_issue_closed_cache_returns_cache_unavailable() {
        let issuer = issuer();
        issuer.cache().close();

        let result = issuer.issue(UserId::new_v4(), "player", true);

        assert!(matches!(result, Err(SessionError::CacheUnavailable(_))));
    }

    #[test]
    fn test_issue_broken_cache_returns_no_tokens() {
        let issuer = SessionIssuer::new(Arc::new(BrokenCache), SessionConfig::default());

        assert!(matches!(
            issuer.issue(UserId::new_v4(), "player", false),
            Err(SessionError::CacheUnavailable(_))
        ));
    }

    #[test]
    fn test_issue_single_session_failed_registration_keeps_existing_sessions() {
        let issuer = SessionIssuer::new(
            Arc::new(RefusingReplace::default()),
            SessionConfig::default(),
        );
        let user = UserId::new_v4();
        let existing = issuer.issue(user, "player", true).unwrap();

        issuer
            .cache()
            .refuse
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let result = issuer.issue(user, "player", true);

        assert!(matches!(result, Err(SessionError::CacheUnavailable(_))));
        assert!(issuer.verify_session(&existing.token).is_ok());
        assert_eq!(issuer.cache().inner.session_count(user), 1);
    }

    // =====================================================================
    // verify_session()
    // =====================================================================

    #[test]
    fn test_verify_session_refresh_token_is_invalid() {
        let issuer = issuer();
        let session = issuer.issue(UserId::new_v4(), "player", true).unwrap();

        assert!(matches!(
            issuer.verify_session(&session.refresh_token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_session_expired_token_returns_expired() {
        let issuer = SessionIssuer::new(
            Arc::new(LocalSessionCache::new()),
            SessionConfig {
                token_expiry_sec: -5,
                ..SessionConfig::default()
            },
        );
        let session = issuer.issue(UserId::new_v4(), "player", true).unwrap();

        assert!(matches!(
            issuer.verify_session(&session.token),
            Err(SessionError::Expired)
        ));
    }

    // =====================================================================
    // refresh() / logout()
    // =====================================================================

    #[test]
    fn test_refresh_rotates_session() {
        let issuer = issuer();
        let user = UserId::new_v4();
        let old = issuer.issue(user, "player", true).unwrap();

        let new = issuer.refresh(&old.refresh_token).unwrap();

        assert_ne!(new.session_id, old.session_id);
        assert!(issuer.verify_session(&new.token).is_ok());
        assert!(matches!(
            issuer.verify_session(&old.token),
            Err(SessionError::Revoked(_))
        ));
    }

    #[test]
    fn test_refresh_same_token_twice_is_revoked() {
        let issuer = issuer();
        let old = issuer.issue(UserId::new_v4(), "player", true).unwrap();

        issuer.refresh(&old.refresh_token).unwrap();

        assert!(matches!(
            issuer.refresh(&old.refresh_token),
            Err(SessionError::Revoked(_))
        ));
    }

    #[test]
    fn test_refresh_with_access_token_is_invalid() {
        let issuer = issuer();
        let session = issuer.issue(UserId::new_v4(), "player", true).unwrap();

        assert!(matches!(
            issuer.refresh(&session.token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_logout_revokes_all_sessions() {
        let issuer = issuer();
        let user = UserId::new_v4();
        let a = issuer.issue(user, "player", false).unwrap();
        let b = issuer.issue(user, "player", false).unwrap();

        issuer.logout(user);

        assert!(issuer.verify_session(&a.token).is_err());
        assert!(issuer.verify_session(&b.token).is_err());
        assert!(issuer.refresh(&b.refresh_token).is_err());
    }
}
