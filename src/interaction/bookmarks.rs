use std::sync::Arc;

use super::{InteractionError, ToggleConfig, ToggleStore};
use crate::models::{Target, TargetType};
use crate::notify::NotificationSink;
use crate::remote::RemoteStore;
use crate::session::SessionProvider;

/// Private topic bookmarks.
pub struct Bookmarks<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    store: ToggleStore<R, S, N>,
}

impl<R, S, N> Bookmarks<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(remote: Arc<R>, session: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store: ToggleStore::new(ToggleConfig::bookmarks(), remote, session, notifier),
        }
    }

    pub fn store(&self) -> &ToggleStore<R, S, N> {
        &self.store
    }

    pub fn is_bookmarked(&self, topic_id: &str) -> bool {
        self.store.is_on(&Target::new(TargetType::Topic, topic_id))
    }

    pub async fn toggle_bookmark(&self, topic_id: &str) -> Result<bool, InteractionError> {
        self.store
            .toggle(&Target::new(TargetType::Topic, topic_id))
            .await
    }

    pub fn bookmarked_topics(&self) -> Vec<String> {
        self.store
            .members(TargetType::Topic)
            .into_iter()
            .map(|target| target.target_id)
            .collect()
    }

    pub async fn fetch_bookmarks(&self) -> Result<(), InteractionError> {
        self.store.fetch_membership().await
    }
}
