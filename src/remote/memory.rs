use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use tracing::debug;
use uuid::Uuid;

use super::{Order, RemoteError, RemoteStore, ToggleFilter};
use crate::models::{ActivityRecord, NewActivity, NewToggle, Table, ToggleRecord};

#[derive(Debug, Clone)]
struct StoredRow {
    table: Table,
    seq: u64,
    record: ToggleRecord,
}

/// In-process remote store.
///
/// `DashMap` shards give lock-free reads across request handlers; the
/// `unique` index is claimed through the entry API so two concurrent
/// inserts of the same `(table, user, target)` cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: DashMap<Uuid, StoredRow>,
    unique: DashMap<(Table, Uuid, String), Uuid>,
    activities: DashMap<Uuid, (u64, ActivityRecord)>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn matching(&self, table: Table, filter: &ToggleFilter) -> Vec<StoredRow> {
        let mut rows: Vec<StoredRow> = self
            .rows
            .iter()
            .filter(|entry| entry.table == table && filter.matches(&entry.record))
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by_key(|row| (row.record.created_at, row.seq));
        if filter.order == Order::Desc {
            rows.reverse();
        }
        if let Some(offset) = filter.offset {
            rows.drain(..offset.min(rows.len()));
        }
        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }
        rows
    }

    /// Activity feed for one user, newest first.
    pub fn activities_for(&self, user_id: Uuid) -> Vec<ActivityRecord> {
        let mut items: Vec<(u64, ActivityRecord)> = self
            .activities
            .iter()
            .filter(|entry| entry.1.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| b.0.cmp(&a.0));
        items.into_iter().map(|(_, record)| record).collect()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(
        &self,
        table: Table,
        filter: &ToggleFilter,
    ) -> Result<Vec<ToggleRecord>, RemoteError> {
        Ok(self
            .matching(table, filter)
            .into_iter()
            .map(|row| row.record)
            .collect())
    }

    async fn insert(&self, table: Table, row: NewToggle) -> Result<ToggleRecord, RemoteError> {
        let unique_key = (table, row.user_id, row.target.key());

        match self.unique.entry(unique_key) {
            Entry::Occupied(_) => Err(RemoteError::Conflict),
            Entry::Vacant(slot) => {
                let record = ToggleRecord {
                    id: Uuid::new_v4(),
                    user_id: row.user_id,
                    target_type: row.target.target_type,
                    target_id: row.target.target_id,
                    created_at: Utc::now().timestamp_millis(),
                };
                slot.insert(record.id);
                self.rows.insert(
                    record.id,
                    StoredRow {
                        table,
                        seq: self.next_seq(),
                        record: record.clone(),
                    },
                );
                debug!("{} row inserted: {}", table, record.id);
                Ok(record)
            }
        }
    }

    async fn delete(&self, table: Table, filter: &ToggleFilter) -> Result<usize, RemoteError> {
        let doomed = self.matching(table, filter);
        let mut deleted = 0;

        for row in doomed {
            if self.rows.remove(&row.record.id).is_some() {
                let target = row.record.target();
                self.unique.remove(&(table, row.record.user_id, target.key()));
                deleted += 1;
            }
        }

        debug!("{} rows deleted from {}", deleted, table);
        Ok(deleted)
    }

    async fn count(&self, table: Table, filter: &ToggleFilter) -> Result<u64, RemoteError> {
        let filter = ToggleFilter {
            offset: None,
            limit: None,
            ..filter.clone()
        };
        let count = self
            .rows
            .iter()
            .filter(|entry| entry.table == table && filter.matches(&entry.record))
            .count();
        Ok(count as u64)
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
    ) -> Result<ActivityRecord, RemoteError> {
        let record = ActivityRecord {
            id: Uuid::new_v4(),
            user_id,
            kind: activity.kind,
            target_type: activity.target_type,
            target_id: activity.target_id,
            created_at: Utc::now().timestamp_millis(),
        };
        self.activities
            .insert(record.id, (self.next_seq(), record.clone()));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityKind, Target, TargetType};

    fn like(user_id: Uuid, id: &str) -> NewToggle {
        NewToggle {
            user_id,
            target: Target::new(TargetType::Topic, id),
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store.insert(Table::Likes, like(user, "t1")).await.unwrap();
        let second = store.insert(Table::Likes, like(user, "t1")).await;

        assert!(matches!(second, Err(RemoteError::Conflict)));
        assert_eq!(
            store
                .count(Table::Likes, &ToggleFilter::new())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn same_target_in_different_tables_is_not_a_conflict() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store.insert(Table::Likes, like(user, "t1")).await.unwrap();
        store.insert(Table::Bookmarks, like(user, "t1")).await.unwrap();
    }

    #[tokio::test]
    async fn delete_frees_the_unique_slot() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.insert(Table::Likes, like(user, "t1")).await.unwrap();

        let filter = ToggleFilter::new()
            .user(user)
            .target_type(TargetType::Topic)
            .target_id("t1");
        assert_eq!(store.delete(Table::Likes, &filter).await.unwrap(), 1);
        assert_eq!(store.delete(Table::Likes, &filter).await.unwrap(), 0);

        store.insert(Table::Likes, like(user, "t1")).await.unwrap();
    }

    #[tokio::test]
    async fn select_orders_and_limits() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for id in ["a", "b", "c"] {
            store.insert(Table::Likes, like(user, id)).await.unwrap();
        }

        let newest = store
            .select(
                Table::Likes,
                &ToggleFilter::new().order(Order::Desc).limit(2),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = newest.iter().map(|r| r.target_id.as_str()).collect();
        assert_eq!(ids, ["c", "b"]);
    }

    #[tokio::test]
    async fn offset_pages_through_rows_in_order() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for id in ["a", "b", "c", "d", "e"] {
            store.insert(Table::Likes, like(user, id)).await.unwrap();
        }

        let mut seen = Vec::new();
        for page in 0..3 {
            let rows = store
                .select(
                    Table::Likes,
                    &ToggleFilter::new().user(user).offset(page * 2).limit(2),
                )
                .await
                .unwrap();
            seen.extend(rows.into_iter().map(|r| r.target_id));
        }
        assert_eq!(seen, ["a", "b", "c", "d", "e"]);

        let past_end = ToggleFilter::new().offset(10);
        assert!(store.select(Table::Likes, &past_end).await.unwrap().is_empty());
        assert_eq!(store.count(Table::Likes, &past_end).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn count_ignores_limit() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .insert(Table::Likes, like(Uuid::new_v4(), "t1"))
                .await
                .unwrap();
        }

        let filter = ToggleFilter::new().target_id("t1").limit(1);
        assert_eq!(store.count(Table::Likes, &filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn activities_are_listed_newest_first() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for id in ["first", "second"] {
            store
                .record_activity(
                    user,
                    NewActivity {
                        kind: ActivityKind::Like,
                        target_type: TargetType::Topic,
                        target_id: id.to_string(),
                    },
                )
                .await
                .unwrap();
        }

        let feed = store.activities_for(user);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].target_id, "second");
        assert!(store.activities_for(Uuid::new_v4()).is_empty());
    }
}
