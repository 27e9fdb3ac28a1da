//! Invites: a player shares their username, new players accept it, and
//! the inviter claims a reward once an invitee has made some progress.
//!
//! Accepting an invite touches two documents, the inviter's and the
//! invitee's, saved one after the other. There is no transaction across
//! them: if the second save fails, the inviter already lists the invitee
//! while the invitee is still uninvited, and may accept again.

use std::collections::HashMap;

use playvault_identity::AccountStore;
use playvault_store::{Codec, Document, DocumentStore, StorageBackend, UserId};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, HomeData};

/// Level an invitee must have moved past for the inviter's reward.
pub const INVITE_REWARD_LEVEL: &str = "L1001";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRecord {
    pub invitee: String,
    pub reward_claimed: bool,
    pub reward_available: bool,
}

/// A player's invite state, in both roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteData {
    /// Players this player invited, by username.
    #[serde(rename = "invite_list")]
    pub invites: HashMap<String, InviteRecord>,
    pub be_invited: bool,
    /// Username of whoever invited this player.
    pub inviter: String,
}

impl Document for InviteData {
    const COLLECTION: &'static str = "user_data";
    const KEY: &'static str = "invite";

    fn initialize(&mut self) {
        self.invites.clear();
        self.be_invited = false;
        self.inviter.clear();
    }
}

/// Result of accepting an invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    Accepted { inviter: String },
    AlreadyInvited,
    InviterNotFound,
    /// The share id names the caller. Nothing was saved.
    SelfInvite,
}

impl InviteOutcome {
    pub fn code(&self) -> i32 {
        match self {
            Self::Accepted { .. } => 0,
            Self::AlreadyInvited => 1,
            Self::InviterNotFound => 2,
            Self::SelfInvite => 3,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "invite accepted",
            Self::AlreadyInvited => "already invited",
            Self::InviterNotFound => "inviter not found",
            Self::SelfInvite => "cannot accept your own invite",
        }
    }
}

/// Result of claiming invite rewards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Every requested invitee is now marked claimed. `newly_claimed`
    /// counts those that weren't already.
    Claimed { newly_claimed: usize },
    /// The named invitee isn't in the caller's list. Nothing was saved.
    UnknownInvitee(String),
}

impl ClaimOutcome {
    pub fn code(&self) -> i32 {
        match self {
            Self::Claimed { .. } => 0,
            Self::UnknownInvitee(_) => 1,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Claimed { .. } => "rewards claimed",
            Self::UnknownInvitee(_) => "invitee not in invite list",
        }
    }
}

/// Accepts the invite of the player named `share_id` on behalf of
/// `user_id` (whose username is `username`).
///
/// A player can't accept their own share id; that returns
/// [`InviteOutcome::SelfInvite`] without writing anything.
pub async fn submit_be_invited<S, C, A>(
    store: &DocumentStore<S, C>,
    accounts: &A,
    user_id: UserId,
    username: &str,
    share_id: &str,
) -> Result<InviteOutcome, FeatureError>
where
    S: StorageBackend,
    C: Codec,
    A: AccountStore,
{
    let mut invitee: InviteData = store.load(user_id).await?;
    if invitee.be_invited {
        tracing::info!(%user_id, share_id, "invite already accepted");
        return Ok(InviteOutcome::AlreadyInvited);
    }

    if share_id == username {
        tracing::warn!(%user_id, share_id, "self-invite rejected");
        return Ok(InviteOutcome::SelfInvite);
    }

    let Some(inviter) = accounts.find_by_username(share_id).await? else {
        tracing::warn!(%user_id, share_id, "inviter not found");
        return Ok(InviteOutcome::InviterNotFound);
    };
    if inviter.user_id == user_id {
        tracing::warn!(%user_id, share_id, "self-invite rejected");
        return Ok(InviteOutcome::SelfInvite);
    }

    let mut inviter_data: InviteData = store.load(inviter.user_id).await?;
    inviter_data.invites.insert(
        username.to_string(),
        InviteRecord {
            invitee: username.to_string(),
            ..InviteRecord::default()
        },
    );
    store.save(inviter.user_id, &inviter_data).await?;

    invitee.be_invited = true;
    invitee.inviter = inviter.username.clone();
    store.save(user_id, &invitee).await?;

    tracing::info!(%user_id, inviter = %inviter.username, "invite accepted");
    Ok(InviteOutcome::Accepted {
        inviter: inviter.username,
    })
}

/// Usernames of the caller's invitees whose reward can be claimed: not yet
/// claimed, and past [`INVITE_REWARD_LEVEL`]. Sorted.
///
/// Invitees whose account no longer exists are skipped.
pub async fn list_invitees<S, C, A>(
    store: &DocumentStore<S, C>,
    accounts: &A,
    user_id: UserId,
) -> Result<Vec<String>, FeatureError>
where
    S: StorageBackend,
    C: Codec,
    A: AccountStore,
{
    let data: InviteData = store.load(user_id).await?;

    let mut ready = Vec::new();
    for record in data.invites.values().filter(|r| !r.reward_claimed) {
        let Some(account) = accounts.find_by_username(&record.invitee).await? else {
            tracing::debug!(%user_id, invitee = %record.invitee, "invitee account gone");
            continue;
        };
        let home: HomeData = store.load(account.user_id).await?;
        if home.is_past(INVITE_REWARD_LEVEL) {
            ready.push(record.invitee.clone());
        }
    }
    ready.sort();
    Ok(ready)
}

/// Marks the rewards for `invitees` as claimed.
///
/// All or nothing: one unknown name and the document is left as it was.
/// Claiming an already-claimed invitee again is accepted and changes
/// nothing.
pub async fn claim_invite_reward<S: StorageBackend, C: Codec>(
    store: &DocumentStore<S, C>,
    user_id: UserId,
    invitees: &[String],
) -> Result<ClaimOutcome, FeatureError> {
    let mut data: InviteData = store.load(user_id).await?;

    if let Some(unknown) = invitees.iter().find(|name| !data.invites.contains_key(*name)) {
        tracing::warn!(%user_id, invitee = %unknown, "claim for unknown invitee");
        return Ok(ClaimOutcome::UnknownInvitee(unknown.clone()));
    }

    let mut newly_claimed = 0;
    for name in invitees {
        if let Some(record) = data.invites.get_mut(name) {
            if !record.reward_claimed {
                record.reward_claimed = true;
                newly_claimed += 1;
            }
        }
    }
    store.save(user_id, &data).await?;

    tracing::info!(%user_id, newly_claimed, "invite rewards claimed");
    Ok(ClaimOutcome::Claimed { newly_claimed })
}
