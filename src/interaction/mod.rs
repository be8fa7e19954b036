//! Optimistic toggle state: likes, bookmarks and hashtag follows.
//!
//! Every toggle flips local state first, then persists remotely and rolls
//! the local change back if the remote write fails. All three flavours share
//! [`ToggleStore`]; the facades only fix the table and target type.

mod bookmarks;
mod hashtags;
mod likes;
mod store;
#[cfg(test)]
pub(crate) mod testing;

pub use bookmarks::Bookmarks;
pub use hashtags::{HashtagFollows, normalize_hashtag};
pub use likes::Likes;
pub use store::ToggleStore;

use async_trait::async_trait;

use crate::models::{ActivityKind, Table, Target};
use crate::remote::RemoteError;

#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("sign in required")]
    NotAuthenticated,
    #[error("remote write failed: {0}")]
    RemoteWriteFailed(#[source] RemoteError),
    #[error("remote read failed: {0}")]
    RemoteReadFailed(#[source] RemoteError),
    #[error("invalid input: {0}")]
    ValidationFailed(String),
}

/// What one [`ToggleStore`] instance persists and how it talks to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleConfig {
    pub table: Table,
    /// Keep a per-target count map in lockstep with membership.
    pub track_counts: bool,
    /// Feed entry appended after a successful toggle-on.
    pub activity: Option<ActivityKind>,
    /// Completes "Please sign in to ...".
    pub sign_in_action: &'static str,
    /// Completes "Failed to update ...".
    pub noun: &'static str,
    pub on_notice: Option<&'static str>,
    pub off_notice: Option<&'static str>,
}

impl ToggleConfig {
    pub fn likes() -> Self {
        Self {
            table: Table::Likes,
            track_counts: true,
            activity: Some(ActivityKind::Like),
            sign_in_action: "like posts",
            noun: "like",
            on_notice: None,
            off_notice: None,
        }
    }

    pub fn bookmarks() -> Self {
        Self {
            table: Table::Bookmarks,
            track_counts: false,
            activity: None,
            sign_in_action: "bookmark topics",
            noun: "bookmark",
            on_notice: Some("Added to bookmarks"),
            off_notice: Some("Removed from bookmarks"),
        }
    }

    pub fn hashtag_follows() -> Self {
        Self {
            table: Table::HashtagFollows,
            track_counts: false,
            activity: Some(ActivityKind::FollowHashtag),
            sign_in_action: "follow hashtags",
            noun: "follow",
            on_notice: Some("Following hashtag"),
            off_notice: Some("Unfollowed hashtag"),
        }
    }
}

/// Capability shared by every toggle flavour.
#[async_trait]
pub trait Interactions: Send + Sync {
    /// Local read; never performs I/O.
    fn is_on(&self, target: &Target) -> bool;

    /// Flip membership for the signed-in user. Returns the new state.
    async fn toggle(&self, target: &Target) -> Result<bool, InteractionError>;

    /// Rebuild local membership from the remote store. On failure the
    /// previous membership is left in place.
    async fn fetch_membership(&self) -> Result<(), InteractionError>;
}
