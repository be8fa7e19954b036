use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::models::{ActivityRecord, NewActivity, NewToggle, Table, ToggleRecord};
use crate::remote::{MemoryStore, RemoteError, RemoteStore, ToggleFilter};

/// `MemoryStore` with switchable failures, an optional insert gate, queued
/// select gates and a read counter.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    pub fail_activities: AtomicBool,
    /// Every `select` and `count` call.
    pub reads: AtomicUsize,
    pub insert_gate: Option<Arc<Semaphore>>,
    select_gates: Mutex<VecDeque<Arc<Semaphore>>>,
    row_cap: Option<usize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts block until a permit is added to the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let store = Self {
            insert_gate: Some(gate.clone()),
            ..Self::default()
        };
        (store, gate)
    }

    /// Truncate every `select` to `cap` rows, like the service does.
    pub fn with_row_cap(mut self, cap: usize) -> Self {
        self.row_cap = Some(cap);
        self
    }

    /// Hold back the result of the next ungated `select` until a permit is
    /// added. The rows are read before waiting, so a late result is stale.
    pub fn gate_next_select(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.select_gates
            .lock()
            .unwrap()
            .push_back(gate.clone());
        gate
    }

    fn refused() -> RemoteError {
        RemoteError::Rejected {
            status: 503,
            message: "unavailable".into(),
        }
    }
}

#[async_trait]
impl RemoteStore for FlakyStore {
    async fn select(
        &self,
        table: Table,
        filter: &ToggleFilter,
    ) -> Result<Vec<ToggleRecord>, RemoteError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        let mut rows = self.inner.select(table, filter).await;
        if let (Ok(rows), Some(cap)) = (rows.as_mut(), self.row_cap) {
            rows.truncate(cap);
        }
        let gate = self.select_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        rows
    }

    async fn insert(&self, table: Table, row: NewToggle) -> Result<ToggleRecord, RemoteError> {
        if let Some(gate) = &self.insert_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.insert(table, row).await
    }

    async fn delete(&self, table: Table, filter: &ToggleFilter) -> Result<usize, RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.delete(table, filter).await
    }

    async fn count(&self, table: Table, filter: &ToggleFilter) -> Result<u64, RemoteError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.count(table, filter).await
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
    ) -> Result<ActivityRecord, RemoteError> {
        if self.fail_activities.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.record_activity(user_id, activity).await
    }
}

/// Yield to other tasks until `cond` holds (bounded).
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if cond() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    cond()
}
