use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{InteractionError, Interactions, ToggleConfig};
use crate::models::{NewActivity, NewToggle, Target, TargetType, ToggleRecord};
use crate::notify::{Notice, NotificationSink};
use crate::remote::{RemoteError, RemoteStore, ToggleFilter};
use crate::session::SessionProvider;

/// Rows requested per page when loading membership. Stays under the
/// service's per-request row cap.
const PAGE_SIZE: usize = 500;
/// Membership loads restarted because a toggle settled mid-fetch.
const MAX_FETCH_ATTEMPTS: usize = 5;

/// Local change applied before the remote call, kept so it can be undone.
#[derive(Debug, Clone, Copy)]
struct Applied {
    turned_on: bool,
    count_before: Option<u64>,
}

/// Per-user toggle membership with optimistic updates.
///
/// The membership map mirrors the signed-in user's rows in one remote
/// table, keyed by `type:id`. The count map only holds keys that were
/// fetched explicitly and is adjusted together with membership.
///
/// Toggles on the same key are serialised: each one holds that key's lock
/// from the local read until its remote write has been reconciled.
/// Different keys never wait on each other.
///
/// A membership load never overwrites a toggle that is still in flight,
/// and is restarted when a toggle settles while its rows were being read.
pub struct ToggleStore<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    config: ToggleConfig,
    remote: Arc<R>,
    session: Arc<S>,
    notifier: Arc<N>,
    membership: DashMap<String, Target>,
    counts: DashMap<String, u64>,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
    /// Intended state of in-flight toggles: `Some` for on, `None` for off.
    pending: DashMap<String, Option<Target>>,
    /// Bumped every time a toggle settles.
    settled: AtomicU64,
    /// Guards the synchronous sections that touch membership and `pending`
    /// together. Never held across an await.
    reconcile: std::sync::Mutex<()>,
    fetch_generation: AtomicU64,
}

impl<R, S, N> ToggleStore<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(config: ToggleConfig, remote: Arc<R>, session: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            config,
            remote,
            session,
            notifier,
            membership: DashMap::new(),
            counts: DashMap::new(),
            key_locks: DashMap::new(),
            pending: DashMap::new(),
            settled: AtomicU64::new(0),
            reconcile: std::sync::Mutex::new(()),
            fetch_generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    pub fn is_on(&self, target: &Target) -> bool {
        self.membership.contains_key(&target.key())
    }

    /// Cached count, `None` until [`fetch_counts`](Self::fetch_counts) has
    /// loaded the key.
    pub fn count(&self, target: &Target) -> Option<u64> {
        self.counts.get(&target.key()).map(|c| *c)
    }

    /// Targets of one type the user is currently "on", sorted by id.
    pub fn members(&self, target_type: TargetType) -> Vec<Target> {
        let mut targets: Vec<Target> = self
            .membership
            .iter()
            .filter(|entry| entry.target_type == target_type)
            .map(|entry| entry.value().clone())
            .collect();
        targets.sort();
        targets
    }

    pub fn len(&self) -> usize {
        self.membership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }

    /// Replace local membership with the signed-in user's remote rows.
    ///
    /// With nobody signed in the set is cleared. When fetches overlap, only
    /// the most recently issued one is applied.
    pub async fn fetch_membership(&self) -> Result<(), InteractionError> {
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(user_id) = self.session.current_user() else {
            let _sync = self.reconcile_guard();
            self.membership.clear();
            return Ok(());
        };

        for _ in 0..MAX_FETCH_ATTEMPTS {
            let settled_before = self.settled.load(Ordering::SeqCst);

            let rows = self.select_all(user_id).await.map_err(|e| {
                warn!("Failed to fetch {}: {}", self.config.table, e);
                InteractionError::RemoteReadFailed(e)
            })?;

            let _sync = self.reconcile_guard();
            if self.fetch_generation.load(Ordering::SeqCst) != generation {
                debug!("Discarding superseded {} fetch", self.config.table);
                return Ok(());
            }
            if self.settled.load(Ordering::SeqCst) != settled_before {
                debug!("{} toggle settled mid-fetch, reloading", self.config.table);
                continue;
            }

            let mut fresh: HashMap<String, Target> = rows
                .into_iter()
                .map(|row| {
                    let target = row.target();
                    (target.key(), target)
                })
                .collect();
            for entry in self.pending.iter() {
                match entry.value() {
                    Some(target) => {
                        fresh.insert(entry.key().clone(), target.clone());
                    }
                    None => {
                        fresh.remove(entry.key());
                    }
                }
            }

            self.membership.clear();
            for (key, target) in fresh {
                self.membership.insert(key, target);
            }
            debug!(
                "Loaded {} {} rows for user {}",
                self.membership.len(),
                self.config.table,
                user_id
            );
            return Ok(());
        }

        warn!(
            "Keeping local {} state: toggles kept settling during {} loads",
            self.config.table, MAX_FETCH_ATTEMPTS
        );
        Ok(())
    }

    /// Every row the user owns, one page at a time.
    async fn select_all(&self, user_id: Uuid) -> Result<Vec<ToggleRecord>, RemoteError> {
        let mut rows = Vec::new();
        loop {
            let filter = ToggleFilter::new()
                .user(user_id)
                .offset(rows.len())
                .limit(PAGE_SIZE);
            let page = self.remote.select(self.config.table, &filter).await?;
            let done = page.len() < PAGE_SIZE;
            rows.extend(page);
            if done {
                return Ok(rows);
            }
        }
    }

    /// Load counts for the ids whose count is not cached yet. Ids without
    /// any rows are cached as 0 so they are not fetched again.
    pub async fn fetch_counts<I, T>(
        &self,
        target_type: TargetType,
        ids: I,
    ) -> Result<(), InteractionError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut wanted: Vec<String> = Vec::new();
        for id in ids.into_iter().map(Into::into) {
            let key = Target::new(target_type, id.clone()).key();
            if !self.counts.contains_key(&key) && !wanted.contains(&id) {
                wanted.push(id);
            }
        }

        for id in wanted {
            let filter = ToggleFilter::new()
                .target_type(target_type)
                .target_id(id.clone());
            let count = self
                .remote
                .count(self.config.table, &filter)
                .await
                .map_err(|e| {
                    warn!("Failed to fetch {} counts: {}", self.config.table, e);
                    InteractionError::RemoteReadFailed(e)
                })?;
            self.counts.insert(Target::new(target_type, id).key(), count);
        }
        Ok(())
    }

    /// Flip membership for the signed-in user and persist it.
    ///
    /// Local state changes before the remote call is issued. A failed
    /// remote write restores membership and count to their exact prior
    /// values. When the remote store is already in the requested state (a
    /// duplicate insert, or a delete matching nothing) the new membership
    /// stands and only the count is restored. Feed side effects are best
    /// effort.
    pub async fn toggle(&self, target: &Target) -> Result<bool, InteractionError> {
        let Some(user_id) = self.session.current_user() else {
            self.notifier.notify(Notice::info(format!(
                "Please sign in to {}",
                self.config.sign_in_action
            )));
            return Err(InteractionError::NotAuthenticated);
        };
        if target.target_id.trim().is_empty() {
            return Err(InteractionError::ValidationFailed(
                "target id must not be empty".into(),
            ));
        }

        let key = target.key();
        let lock = self.key_lock(&key);
        let guard = lock.lock().await;

        let applied = {
            let _sync = self.reconcile_guard();
            let was_on = self.membership.contains_key(&key);
            let applied = self.apply(&key, target, !was_on);
            self.pending
                .insert(key.clone(), applied.turned_on.then(|| target.clone()));
            applied
        };
        let now_on = applied.turned_on;

        let table = self.config.table;
        // Ok(false): the remote store was already in the requested state.
        let outcome = if now_on {
            let row = NewToggle {
                user_id,
                target: target.clone(),
            };
            match self.remote.insert(table, row).await {
                Ok(_) => Ok(true),
                Err(RemoteError::Conflict) => Ok(false),
                Err(e) => Err(e),
            }
        } else {
            let filter = ToggleFilter::new()
                .user(user_id)
                .target_type(target.target_type)
                .target_id(target.target_id.clone());
            self.remote.delete(table, &filter).await.map(|n| n > 0)
        };

        {
            let _sync = self.reconcile_guard();
            self.settled.fetch_add(1, Ordering::SeqCst);
            self.pending.remove(&key);
            match &outcome {
                Err(_) => self.revert(&key, target, applied),
                Ok(false) => self.restore_count(&key, applied),
                Ok(true) => {}
            }
        }
        drop(guard);
        self.release_lock(&key, lock);

        match outcome {
            Err(err) => {
                error!("Failed to update {} for {}: {}", table, target, err);
                self.notifier.notify(Notice::error(format!(
                    "Failed to update {}",
                    self.config.noun
                )));
                return Err(InteractionError::RemoteWriteFailed(err));
            }
            Ok(false) => {
                info!(
                    "{} {} for user {} was already {}",
                    table, target, user_id, now_on
                );
            }
            Ok(true) => {
                info!("{} {} for user {}: {}", table, target, user_id, now_on);
                if now_on {
                    self.record_activity(user_id, target).await;
                }
            }
        }

        let message = if now_on {
            self.config.on_notice
        } else {
            self.config.off_notice
        };
        if let Some(message) = message {
            self.notifier.notify(Notice::success(message));
        }

        Ok(now_on)
    }

    async fn record_activity(&self, user_id: Uuid, target: &Target) {
        let Some(kind) = self.config.activity else {
            return;
        };
        let activity = NewActivity {
            kind,
            target_type: target.target_type,
            target_id: target.target_id.clone(),
        };
        if let Err(e) = self.remote.record_activity(user_id, activity).await {
            warn!("Failed to record activity for {}: {}", target, e);
        }
    }

    fn reconcile_guard(&self) -> MutexGuard<'_, ()> {
        self.reconcile.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.key_locks.entry(key.to_string()).or_default().clone()
    }

    /// Drop the key's lock entry once no other toggle holds or awaits it.
    fn release_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.key_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn apply(&self, key: &str, target: &Target, turn_on: bool) -> Applied {
        if turn_on {
            self.membership.insert(key.to_string(), target.clone());
        } else {
            self.membership.remove(key);
        }

        let count_before = if self.config.track_counts {
            self.counts.get_mut(key).map(|mut count| {
                let before = *count;
                *count = if turn_on {
                    before + 1
                } else {
                    before.saturating_sub(1)
                };
                before
            })
        } else {
            None
        };

        Applied {
            turned_on: turn_on,
            count_before,
        }
    }

    fn revert(&self, key: &str, target: &Target, applied: Applied) {
        if applied.turned_on {
            self.membership.remove(key);
        } else {
            self.membership.insert(key.to_string(), target.clone());
        }
        self.restore_count(key, applied);
    }

    fn restore_count(&self, key: &str, applied: Applied) {
        if let Some(before) = applied.count_before {
            self.counts.insert(key.to_string(), before);
        }
    }
}

#[async_trait]
impl<R, S, N> Interactions for ToggleStore<R, S, N>
where
    R: RemoteStore + ?Sized,
    S: SessionProvider + ?Sized,
    N: NotificationSink + ?Sized,
{
    fn is_on(&self, target: &Target) -> bool {
        ToggleStore::is_on(self, target)
    }

    async fn toggle(&self, target: &Target) -> Result<bool, InteractionError> {
        ToggleStore::toggle(self, target).await
    }

    async fn fetch_membership(&self) -> Result<(), InteractionError> {
        ToggleStore::fetch_membership(self).await
    }
}
