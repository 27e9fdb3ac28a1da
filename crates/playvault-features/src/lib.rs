//! Game features for Playvault.
//!
//! Each feature is a handful of async functions over a [`DocumentStore`]
//! that load a player's record, apply the feature's rules and save it
//! back:
//!
//! - **Feedback** ([`submit_feedback`]): bounded report history.
//! - **Gift codes** ([`redeem_gift`]): single-use per player, checked
//!   against the [`RedemptionTable`].
//! - **Invites** ([`submit_be_invited`], [`list_invitees`],
//!   [`claim_invite_reward`]).
//! - **Progress** ([`load_progress`], [`save_progress`]).
//!
//! Rejections a player can cause are returned as outcome values
//! ([`RedeemOutcome`], [`InviteOutcome`], [`ClaimOutcome`]); only
//! collaborator failures become a [`FeatureError`].
//!
//! [`DocumentStore`]: playvault_store::DocumentStore

mod error;
mod feedback;
mod giftcode;
mod invite;
mod progress;
mod templates;

pub use error::FeatureError;
pub use feedback::{FeedbackHistory, FeedbackRecord, MAX_FEEDBACK_RECORDS, submit_feedback};
pub use giftcode::{RedeemHistory, RedeemOutcome, RedeemRecord, redeem_gift};
pub use invite::{
    ClaimOutcome, INVITE_REWARD_LEVEL, InviteData, InviteOutcome, InviteRecord,
    claim_invite_reward, list_invitees, submit_be_invited,
};
pub use progress::{HomeData, load_progress, save_progress};
pub use templates::{REDEMPTION_KEY, Redemption, RedemptionTable, TEMPLATE_COLLECTION};
