use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TargetType;

/// What happened, as shown in the activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Like,
    FollowHashtag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub target_type: TargetType,
    pub target_id: String,
    pub created_at: i64,
}

/// Activity row before the store assigns id, owner and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub target_type: TargetType,
    pub target_id: String,
}
