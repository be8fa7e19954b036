use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of entity a user can like, bookmark or follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Topic,
    Comment,
    Hashtag,
    Event,
    Profile,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Topic => "topic",
            TargetType::Comment => "comment",
            TargetType::Hashtag => "hashtag",
            TargetType::Event => "event",
            TargetType::Profile => "profile",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topic" => Ok(TargetType::Topic),
            "comment" => Ok(TargetType::Comment),
            "hashtag" => Ok(TargetType::Hashtag),
            "event" => Ok(TargetType::Event),
            "profile" => Ok(TargetType::Profile),
            other => Err(format!("unknown target type `{other}`")),
        }
    }
}

/// A `(target_type, target_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub target_type: TargetType,
    pub target_id: String,
}

impl Target {
    pub fn new(target_type: TargetType, target_id: impl Into<String>) -> Self {
        Self {
            target_type,
            target_id: target_id.into(),
        }
    }

    /// Composite key used for local set/map indexing: `type:id`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.target_type, self.target_id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.target_id)
    }
}

/// Remote tables holding toggle records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Likes,
    Bookmarks,
    HashtagFollows,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Likes => "likes",
            Table::Bookmarks => "bookmarks",
            Table::HashtagFollows => "hashtag_follows",
        }
    }

    /// Private tables are only readable by the row owner.
    pub fn is_private(&self) -> bool {
        matches!(self, Table::Bookmarks)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "likes" => Ok(Table::Likes),
            "bookmarks" => Ok(Table::Bookmarks),
            "hashtag_follows" => Ok(Table::HashtagFollows),
            other => Err(format!("unknown table `{other}`")),
        }
    }
}

/// One user's relationship to one target. Created on toggle-on, deleted on
/// toggle-off, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_type: TargetType,
    pub target_id: String,
    pub created_at: i64,
}

impl ToggleRecord {
    pub fn target(&self) -> Target {
        Target::new(self.target_type, self.target_id.clone())
    }
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToggle {
    pub user_id: Uuid,
    pub target: Target,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_joins_type_and_id() {
        let target = Target::new(TargetType::Topic, "t1");
        assert_eq!(target.key(), "topic:t1");
        assert_eq!(target.to_string(), "topic:t1");
    }

    #[test]
    fn table_names_parse_back() {
        for table in [Table::Likes, Table::Bookmarks, Table::HashtagFollows] {
            assert_eq!(table.as_str().parse::<Table>(), Ok(table));
        }
        assert!("posts".parse::<Table>().is_err());
    }

    #[test]
    fn target_type_serializes_snake_case() {
        let json = serde_json::to_string(&TargetType::Hashtag).unwrap();
        assert_eq!(json, "\"hashtag\"");
        assert_eq!("comment".parse::<TargetType>(), Ok(TargetType::Comment));
    }
}
