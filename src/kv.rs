//! Injected client-side key-value storage and the flags kept in it.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Whether a user has already been through onboarding, scoped per user.
pub struct Onboarding<K: KeyValueStore + ?Sized> {
    kv: Arc<K>,
}

impl<K: KeyValueStore + ?Sized> Onboarding<K> {
    const PREFIX: &'static str = "onboarding_seen";

    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    fn key(user_id: Uuid) -> String {
        format!("{}:{}", Self::PREFIX, user_id)
    }

    pub fn has_seen(&self, user_id: Uuid) -> bool {
        self.kv.get(&Self::key(user_id)).as_deref() == Some("true")
    }

    pub fn mark_seen(&self, user_id: Uuid) {
        self.kv.set(&Self::key(user_id), "true");
    }

    pub fn reset(&self, user_id: Uuid) {
        self.kv.remove(&Self::key(user_id));
    }
}
