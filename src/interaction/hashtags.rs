use std::sync::Arc;

use super::{InteractionError, ToggleConfig, ToggleStore};
use crate::models::{Target, TargetType};
use crate::notify::NotificationSink;
use crate::remote::RemoteStore;
use crate::session::SessionProvider;

/// `"#Rust "` and `"rust"` name the same hashtag.
pub fn normalize_hashtag(raw: &str) -> Result<String, InteractionError> {
    let tag = raw.trim().trim_start_matches('#').trim().to_lowercase();
    if tag.is_empty() {
        return Err(InteractionError::ValidationFailed(
            "hashtag must not be empty".into(),
        ));
    }
    if tag.chars().any(char::is_whitespace) {
        return Err(InteractionError::ValidationFailed(format!(
            "hashtag `{tag}` must be a single word"
        )));
    }
    Ok(tag)
}

pub struct HashtagFollows<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    store: ToggleStore<R, S, N>,
}

impl<R, S, N> HashtagFollows<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(remote: Arc<R>, session: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store: ToggleStore::new(ToggleConfig::hashtag_follows(), remote, session, notifier),
        }
    }

    pub fn store(&self) -> &ToggleStore<R, S, N> {
        &self.store
    }

    /// Malformed tags are simply not followed.
    pub fn is_following(&self, hashtag: &str) -> bool {
        normalize_hashtag(hashtag)
            .map(|tag| self.store.is_on(&Target::new(TargetType::Hashtag, tag)))
            .unwrap_or(false)
    }

    pub async fn toggle_follow(&self, hashtag: &str) -> Result<bool, InteractionError> {
        let tag = normalize_hashtag(hashtag)?;
        self.store
            .toggle(&Target::new(TargetType::Hashtag, tag))
            .await
    }

    pub fn followed_hashtags(&self) -> Vec<String> {
        self.store
            .members(TargetType::Hashtag)
            .into_iter()
            .map(|target| target.target_id)
            .collect()
    }

    pub async fn fetch_follows(&self) -> Result<(), InteractionError> {
        self.store.fetch_membership().await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::interaction::testing::FlakyStore;
    use crate::models::ActivityKind;
    use crate::notify::{Notice, NoticeLog};
    use crate::session::Session;

    #[test]
    fn normalization() {
        assert_eq!(normalize_hashtag("#Rust").unwrap(), "rust");
        assert_eq!(normalize_hashtag("  # WebDev ").unwrap(), "webdev");
        assert!(matches!(
            normalize_hashtag("#"),
            Err(InteractionError::ValidationFailed(_))
        ));
        assert!(normalize_hashtag("two words").is_err());
    }

    #[tokio::test]
    async fn follow_is_case_insensitive_and_recorded_in_feed() {
        let user = Uuid::new_v4();
        let remote = Arc::new(FlakyStore::new());
        let notices = Arc::new(NoticeLog::new());
        let follows = HashtagFollows::new(
            remote.clone(),
            Arc::new(Session::signed_in(user)),
            notices.clone(),
        );

        assert!(follows.toggle_follow("#Rust").await.unwrap());

        assert!(follows.is_following("rust"));
        assert!(follows.is_following("#RUST"));
        assert_eq!(follows.followed_hashtags(), ["rust"]);
        assert_eq!(notices.last(), Some(Notice::success("Following hashtag")));
        let feed = remote.inner.activities_for(user);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, ActivityKind::FollowHashtag);

        assert!(!follows.toggle_follow("rust").await.unwrap());
        assert!(follows.followed_hashtags().is_empty());
        assert_eq!(remote.inner.activities_for(user).len(), 1);
    }

    #[tokio::test]
    async fn invalid_tag_never_reaches_the_store() {
        let remote = Arc::new(FlakyStore::new());
        let follows = HashtagFollows::new(
            remote.clone(),
            Arc::new(Session::signed_in(Uuid::new_v4())),
            Arc::new(NoticeLog::new()),
        );

        assert!(follows.toggle_follow("   ").await.is_err());
        assert!(!follows.is_following(""));
        assert_eq!(
            remote
                .reads
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }
}
