//! Home screen progress: the level a player is currently on.

use playvault_store::{Codec, Document, DocumentStore, StorageBackend, UserId};
use serde::{Deserialize, Serialize};

use crate::FeatureError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeData {
    /// Level ids sort in play order (`"L1001"`, `"L1002"`, ...).
    #[serde(rename = "curLevelId")]
    pub cur_level_id: String,
}

impl HomeData {
    /// `true` if the player has moved past `level`.
    pub fn is_past(&self, level: &str) -> bool {
        self.cur_level_id.as_str() > level
    }
}

impl Document for HomeData {
    const COLLECTION: &'static str = "Home";
    const KEY: &'static str = "HomeData";

    fn initialize(&mut self) {
        self.cur_level_id.clear();
    }
}

pub async fn load_progress<S: StorageBackend, C: Codec>(
    store: &DocumentStore<S, C>,
    user_id: UserId,
) -> Result<HomeData, FeatureError> {
    Ok(store.load(user_id).await?)
}

pub async fn save_progress<S: StorageBackend, C: Codec>(
    store: &DocumentStore<S, C>,
    user_id: UserId,
    level_id: &str,
) -> Result<(), FeatureError> {
    let home = HomeData {
        cur_level_id: level_id.to_string(),
    };
    store.save(user_id, &home).await?;
    tracing::debug!(%user_id, level_id, "progress saved");
    Ok(())
}
