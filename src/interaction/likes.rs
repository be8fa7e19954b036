use std::sync::Arc;

use super::{InteractionError, ToggleConfig, ToggleStore};
use crate::models::{Target, TargetType};
use crate::notify::NotificationSink;
use crate::remote::RemoteStore;
use crate::session::SessionProvider;

/// Likes on topics, comments and events, with cached like counts.
pub struct Likes<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    store: ToggleStore<R, S, N>,
}

impl<R, S, N> Likes<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(remote: Arc<R>, session: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store: ToggleStore::new(ToggleConfig::likes(), remote, session, notifier),
        }
    }

    pub fn store(&self) -> &ToggleStore<R, S, N> {
        &self.store
    }

    pub fn is_liked(&self, target_type: TargetType, target_id: &str) -> bool {
        self.store.is_on(&Target::new(target_type, target_id))
    }

    pub async fn toggle_like(
        &self,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<bool, InteractionError> {
        self.store
            .toggle(&Target::new(target_type, target_id))
            .await
    }

    /// Cached like count; 0 when it has not been fetched yet.
    pub fn like_count(&self, target_type: TargetType, target_id: &str) -> u64 {
        self.store
            .count(&Target::new(target_type, target_id))
            .unwrap_or(0)
    }

    pub async fn fetch_like_counts(
        &self,
        target_type: TargetType,
        ids: &[&str],
    ) -> Result<(), InteractionError> {
        self.store
            .fetch_counts(target_type, ids.iter().copied())
            .await
    }

    pub async fn fetch_likes(&self) -> Result<(), InteractionError> {
        self.store.fetch_membership().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use uuid::Uuid;

    use super::*;
    use crate::interaction::testing::FlakyStore;
    use crate::notify::{NoticeKind, NoticeLog};
    use crate::session::Session;

    fn likes() -> (Arc<FlakyStore>, Arc<NoticeLog>, Likes<FlakyStore, Session, NoticeLog>) {
        let remote = Arc::new(FlakyStore::new());
        let notices = Arc::new(NoticeLog::new());
        let likes = Likes::new(
            remote.clone(),
            Arc::new(Session::signed_in(Uuid::new_v4())),
            notices.clone(),
        );
        (remote, notices, likes)
    }

    #[tokio::test]
    async fn liking_an_unliked_topic() {
        let (_, _, likes) = likes();
        likes
            .fetch_like_counts(TargetType::Topic, &["t1"])
            .await
            .unwrap();
        let before = likes.like_count(TargetType::Topic, "t1");

        assert!(likes.toggle_like(TargetType::Topic, "t1").await.unwrap());

        assert!(likes.is_liked(TargetType::Topic, "t1"));
        assert_eq!(likes.like_count(TargetType::Topic, "t1"), before + 1);
    }

    #[tokio::test]
    async fn rejected_like_reverts() {
        let (remote, notices, likes) = likes();
        likes
            .fetch_like_counts(TargetType::Topic, &["t1"])
            .await
            .unwrap();
        remote.fail_writes.store(true, Ordering::SeqCst);

        assert!(likes.toggle_like(TargetType::Topic, "t1").await.is_err());

        assert!(!likes.is_liked(TargetType::Topic, "t1"));
        assert_eq!(likes.like_count(TargetType::Topic, "t1"), 0);
        assert_eq!(notices.last().unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn comment_and_topic_with_same_id_are_distinct() {
        let (_, _, likes) = likes();
        likes.toggle_like(TargetType::Comment, "x").await.unwrap();

        assert!(likes.is_liked(TargetType::Comment, "x"));
        assert!(!likes.is_liked(TargetType::Topic, "x"));
    }
}
