//! Read-only design data ("templates") shipped alongside the server.
//!
//! Templates are looked up in storage first, as global documents in the
//! `Tpl` collection, and fall back to a JSON file in the data directory.
//! A table that can't be read from either place is empty: the server keeps
//! running, and lookups simply find nothing.

use std::collections::HashMap;
use std::path::Path;

use playvault_store::{Codec, DocumentStore, StorageBackend};
use serde::{Deserialize, Serialize};

/// Collection holding template tables.
pub const TEMPLATE_COLLECTION: &str = "Tpl";

/// Key of the redemption table.
pub const REDEMPTION_KEY: &str = "TplRedemption";

/// A redeemable gift code and what it grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Redemption {
    pub id: String,
    pub name: String,
    pub coin: i32,
    pub coupon: i32,
    pub gem: i32,
    /// Item grant list, in the client's own notation.
    pub items: String,
    pub expire: String,
}

/// Gift codes by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedemptionTable {
    entries: HashMap<String, Redemption>,
}

impl RedemptionTable {
    pub fn new(entries: impl IntoIterator<Item = Redemption>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    /// Parses a table from its JSON form (`{"<id>": {...}, ...}`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    /// Loads the table from storage, falling back to
    /// `<data_dir>/TplRedemption.json`.
    ///
    /// Never fails: an unreadable or malformed table is logged and comes
    /// back empty.
    pub async fn load<S: StorageBackend, C: Codec>(
        store: &DocumentStore<S, C>,
        data_dir: &Path,
    ) -> Self {
        let stored = match store.read_raw(TEMPLATE_COLLECTION, REDEMPTION_KEY).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(error = %e, "failed to read redemption table from storage");
                None
            }
        };

        let (source, json) = match stored {
            Some(json) => ("storage".to_string(), json),
            None => {
                let path = data_dir.join(format!("{REDEMPTION_KEY}.json"));
                match tokio::fs::read_to_string(&path).await {
                    Ok(json) => (path.display().to_string(), json),
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "failed to read redemption table");
                        return Self::default();
                    }
                }
            }
        };

        match Self::from_json(&json) {
            Ok(table) => {
                tracing::info!(%source, entries = table.len(), "redemption table loaded");
                table
            }
            Err(e) => {
                tracing::error!(%source, error = %e, "malformed redemption table");
                Self::default()
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Redemption> {
        self.entries.get(id)
    }

    pub fn find_all(&self) -> Vec<&Redemption> {
        self.entries.values().collect()
    }

    pub fn find_by(&self, mut predicate: impl FnMut(&Redemption) -> bool) -> Vec<&Redemption> {
        self.entries.values().filter(|entry| predicate(entry)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
