//! Gift code redemption. Each code can be redeemed once per player.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use playvault_store::{Codec, Document, DocumentStore, StorageBackend, UserId};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, RedemptionTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemRecord {
    pub code: String,
    #[serde(rename = "time")]
    pub redeemed_at: DateTime<Utc>,
}

/// Codes a player has redeemed, by code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedeemHistory {
    pub records: HashMap<String, RedeemRecord>,
}

impl Document for RedeemHistory {
    const COLLECTION: &'static str = "user_data";
    const KEY: &'static str = "redeem";

    fn initialize(&mut self) {
        self.records.clear();
    }
}

/// Result of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    Redeemed,
    AlreadyRedeemed,
    InvalidCode,
}

impl RedeemOutcome {
    /// Numeric result code reported to the client.
    pub fn code(self) -> i32 {
        match self {
            Self::Redeemed => 0,
            Self::AlreadyRedeemed => 1,
            Self::InvalidCode => 2,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Redeemed => "redeemed",
            Self::AlreadyRedeemed => "gift code already redeemed",
            Self::InvalidCode => "invalid gift code",
        }
    }
}

/// Redeems `code` for `user_id`.
///
/// Only a successful redemption writes; rejected attempts leave the
/// player's history untouched.
pub async fn redeem_gift<S: StorageBackend, C: Codec>(
    store: &DocumentStore<S, C>,
    table: &RedemptionTable,
    user_id: UserId,
    code: &str,
) -> Result<RedeemOutcome, FeatureError> {
    let mut history: RedeemHistory = store.load(user_id).await?;

    if table.find(code).is_none() {
        tracing::info!(%user_id, code, "invalid gift code");
        return Ok(RedeemOutcome::InvalidCode);
    }
    if history.records.contains_key(code) {
        tracing::info!(%user_id, code, "gift code already redeemed");
        return Ok(RedeemOutcome::AlreadyRedeemed);
    }

    history.records.insert(
        code.to_string(),
        RedeemRecord {
            code: code.to_string(),
            redeemed_at: Utc::now(),
        },
    );
    store.save(user_id, &history).await?;
    tracing::info!(%user_id, code, "gift code redeemed");
    Ok(RedeemOutcome::Redeemed)
}

#[cfg(test)]
mod tests {
    use playvault_store::MemoryStorage;

    use super::*;
    use crate::Redemption;

    fn table() -> RedemptionTable {
        RedemptionTable::new([Redemption {
            id: "WELCOME".into(),
            coin: 100,
            ..Redemption::default()
        }])
    }

    #[tokio::test]
    async fn test_redeem_gift_valid_code_then_again_returns_already_redeemed() {
        let store = DocumentStore::new(MemoryStorage::new());
        let user = UserId::new_v4();

        let first = redeem_gift(&store, &table(), user, "WELCOME").await.unwrap();
        let second = redeem_gift(&store, &table(), user, "WELCOME").await.unwrap();

        assert_eq!(first, RedeemOutcome::Redeemed);
        assert_eq!(second, RedeemOutcome::AlreadyRedeemed);
        assert_eq!(second.code(), 1);
        let history: RedeemHistory = store.load(user).await.unwrap();
        assert_eq!(history.records.len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_gift_is_per_player() {
        let store = DocumentStore::new(MemoryStorage::new());

        let alice = redeem_gift(&store, &table(), UserId::new_v4(), "WELCOME").await.unwrap();
        let bob = redeem_gift(&store, &table(), UserId::new_v4(), "WELCOME").await.unwrap();

        assert_eq!(alice, RedeemOutcome::Redeemed);
        assert_eq!(bob, RedeemOutcome::Redeemed);
    }

    #[tokio::test]
    async fn test_redeem_gift_unknown_code_returns_invalid_and_writes_nothing() {
        let store = DocumentStore::new(MemoryStorage::new());

        let outcome = redeem_gift(&store, &table(), UserId::new_v4(), "NOPE").await.unwrap();

        assert_eq!(outcome, RedeemOutcome::InvalidCode);
        assert_eq!(outcome.code(), 2);
        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_gift_empty_table_rejects_everything() {
        let store = DocumentStore::new(MemoryStorage::new());

        let outcome = redeem_gift(&store, &RedemptionTable::default(), UserId::new_v4(), "WELCOME")
            .await
            .unwrap();

        assert_eq!(outcome, RedeemOutcome::InvalidCode);
    }
}
