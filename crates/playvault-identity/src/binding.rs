//! Identity binding: external subject identifier → internal account.
//!
//! The first time an external identity authenticates, an account (a fresh
//! [`UserId`] plus a generated username) is created and bound to it.
//! Every later authentication finds that same account.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use playvault_store::UserId;
use rand::Rng;

use crate::{ExternalId, IdentityError};

/// Characters used in generated usernames.
const USERNAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated usernames.
pub const USERNAME_LEN: usize = 10;

/// A player account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user_id: UserId,
    /// Display name; also the handle other players use to refer to this
    /// account (e.g. as an invite `share_id`).
    pub username: String,
}

/// Result of [`AccountStore::authenticate_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub account: Account,
    /// `true` if the account was created by this call.
    pub created: bool,
}

/// Persistent mapping between external identities and accounts.
///
/// # Atomicity
///
/// `authenticate_or_create` must be a single atomic upsert-if-absent:
/// two concurrent first-time logins for the same external id must end up
/// with the same account, never two.
pub trait AccountStore: Send + Sync + 'static {
    /// Finds the account bound to `external_id`, creating it (with
    /// `username`) when absent and `create` is set.
    ///
    /// # Errors
    /// - [`IdentityError::AccountNotFound`]: absent and `create` is false.
    /// - [`IdentityError::UsernameTaken`]: `username` belongs to another
    ///   account.
    fn authenticate_or_create(
        &self,
        external_id: &ExternalId,
        username: &str,
        create: bool,
    ) -> impl Future<Output = Result<Authenticated, IdentityError>> + Send;

    /// Looks an account up by username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Account>, IdentityError>> + Send;

    /// Looks an account up by id.
    fn find_by_id(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Account>, IdentityError>> + Send;
}

/// Generates a random username for a new account.
pub fn generate_username() -> String {
    let mut rng = rand::rng();
    (0..USERNAME_LEN)
        .map(|_| USERNAME_ALPHABET[rng.random_range(0..USERNAME_ALPHABET.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// MemoryAccounts
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AccountIndex {
    by_external: HashMap<ExternalId, UserId>,
    by_username: HashMap<String, UserId>,
    accounts: HashMap<UserId, Account>,
}

/// An [`AccountStore`] kept in memory.
///
/// All three indexes live behind one mutex, so lookup-then-insert is a
/// single critical section.
#[derive(Default)]
pub struct MemoryAccounts {
    index: Mutex<AccountIndex>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.index.lock().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountStore for MemoryAccounts {
    async fn authenticate_or_create(
        &self,
        external_id: &ExternalId,
        username: &str,
        create: bool,
    ) -> Result<Authenticated, IdentityError> {
        let mut index = self.index.lock();

        if let Some(user_id) = index.by_external.get(external_id) {
            let account = index
                .accounts
                .get(user_id)
                .cloned()
                .ok_or_else(|| IdentityError::Unavailable(format!("dangling binding for {external_id}")))?;
            return Ok(Authenticated {
                account,
                created: false,
            });
        }

        if !create {
            return Err(IdentityError::AccountNotFound(external_id.to_string()));
        }
        if index.by_username.contains_key(username) {
            return Err(IdentityError::UsernameTaken(username.to_string()));
        }

        let account = Account {
            user_id: UserId::new_v4(),
            username: username.to_string(),
        };
        index.by_external.insert(external_id.clone(), account.user_id);
        index.by_username.insert(account.username.clone(), account.user_id);
        index.accounts.insert(account.user_id, account.clone());

        tracing::info!(user_id = %account.user_id, username = %account.username, "account created");
        Ok(Authenticated {
            account,
            created: true,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, IdentityError> {
        let index = self.index.lock();
        Ok(index
            .by_username
            .get(username)
            .and_then(|id| index.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<Account>, IdentityError> {
        Ok(self.index.lock().accounts.get(&user_id).cloned())
    }
}
