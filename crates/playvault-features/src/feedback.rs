//! Player feedback: a short, bounded history of reports per player.

use chrono::{DateTime, Utc};
use playvault_store::{Codec, Document, DocumentStore, StorageBackend, UserId};
use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// How many reports a player's history keeps.
pub const MAX_FEEDBACK_RECORDS: usize = 10;

/// One feedback report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "content")]
    pub description: String,
    /// Client-defined issue category flags.
    pub issues: i32,
    #[serde(rename = "time")]
    pub reported_at: DateTime<Utc>,
}

/// The last [`MAX_FEEDBACK_RECORDS`] reports of a player, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackHistory {
    pub list: Vec<FeedbackRecord>,
}

impl FeedbackHistory {
    /// Appends `record`, dropping the oldest one when the history is full.
    pub fn push(&mut self, record: FeedbackRecord) {
        if self.list.len() >= MAX_FEEDBACK_RECORDS {
            let excess = self.list.len() + 1 - MAX_FEEDBACK_RECORDS;
            self.list.drain(..excess);
        }
        self.list.push(record);
    }
}

impl Document for FeedbackHistory {
    const COLLECTION: &'static str = "manager_data";
    const KEY: &'static str = "feedback";

    fn initialize(&mut self) {
        self.list.clear();
    }
}

/// Records a feedback report for `user_id`.
pub async fn submit_feedback<S: StorageBackend, C: Codec>(
    store: &DocumentStore<S, C>,
    user_id: UserId,
    description: &str,
    issues: i32,
) -> Result<(), FeatureError> {
    let mut history: FeedbackHistory = store.load(user_id).await?;
    history.push(FeedbackRecord {
        description: description.to_string(),
        issues,
        reported_at: Utc::now(),
    });
    store.save(user_id, &history).await?;
    tracing::info!(%user_id, issues, records = history.list.len(), "feedback recorded");
    Ok(())
}
