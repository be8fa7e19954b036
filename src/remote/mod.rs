//! Contract for the remote data store holding toggle and activity rows.
//!
//! Two implementations ship with the crate: [`MemoryStore`], an in-process
//! store that also backs the HTTP service, and [`HttpStore`], a client for
//! that service's REST surface.

mod http;
mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActivityRecord, NewActivity, NewToggle, Table, TargetType, ToggleRecord};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("not signed in")]
    Unauthorized,
    #[error("row already exists")]
    Conflict,
    #[error("not found")]
    NotFound,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Row filter. Every set field must match; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleFilter {
    pub user_id: Option<Uuid>,
    pub target_type: Option<TargetType>,
    pub target_id: Option<String>,
    pub target_ids: Option<Vec<String>>,
    /// Case-insensitive substring match on `target_id`.
    pub search: Option<String>,
    pub order: Order,
    /// Rows skipped after ordering, before `limit`.
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ToggleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn target_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &ToggleRecord) -> bool {
        if self.user_id.is_some_and(|u| u != record.user_id) {
            return false;
        }
        if self.target_type.is_some_and(|t| t != record.target_type) {
            return false;
        }
        if let Some(id) = &self.target_id {
            if *id != record.target_id {
                return false;
            }
        }
        if let Some(ids) = &self.target_ids {
            if !ids.iter().any(|id| *id == record.target_id) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            if !record
                .target_id
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Request/response CRUD over toggle tables plus the activity feed.
///
/// `insert` must reject a second row for the same
/// `(user_id, target_type, target_id)` with [`RemoteError::Conflict`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(
        &self,
        table: Table,
        filter: &ToggleFilter,
    ) -> Result<Vec<ToggleRecord>, RemoteError>;

    async fn insert(&self, table: Table, row: NewToggle) -> Result<ToggleRecord, RemoteError>;

    async fn delete(&self, table: Table, filter: &ToggleFilter) -> Result<usize, RemoteError>;

    async fn count(&self, table: Table, filter: &ToggleFilter) -> Result<u64, RemoteError>;

    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
    ) -> Result<ActivityRecord, RemoteError>;
}
