//! `MemoryStore` — the in-process reference [`Store`] implementation.
//! Backs every test in this workspace and stands in for the out-of-scope
//! physical store transport.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::glob::glob_match;
use crate::trait_def::Store;

struct ExpiringValue {
    value: String,
    expires_at: Option<Instant>,
}

impl ExpiringValue {
    fn is_live(&self) -> bool {
        self.expires_at.map(|at| at > Instant::now()).unwrap_or(true)
    }
}

const BROADCAST_CAPACITY: usize = 256;

/// `DashMap`-sharded hashes and strings, `Instant`-based TTL checked lazily
/// on read, and one `broadcast` channel per distinct channel name — created
/// on first `subscribe` or `publish`, whichever comes first.
#[derive(Default)]
pub struct MemoryStore {
    hashes: DashMap<String, DashMap<String, String>>,
    strings: DashMap<String, ExpiringValue>,
    expirations: DashMap<String, Instant>,
    channels: DashMap<String, broadcast::Sender<(String, String)>>,
    // Guards channel creation so two racing publish/subscribe calls can't
    // each create a distinct sender for the same channel name.
    channel_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<(String, String)> {
        if let Some(tx) = self.channels.get(channel) {
            return tx.clone();
        }
        let _guard = self.channel_lock.lock();
        if let Some(tx) = self.channels.get(channel) {
            return tx.clone();
        }
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        self.channels.insert(channel.to_string(), tx.clone());
        tx
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn hget(&self, key: &str, field: &str) -> Option<String> {
        if !self.hash_key_live(key) {
            return None;
        }
        self.hashes.get(key)?.get(field).map(|v| v.clone())
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> bool {
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value);
        true
    }

    async fn hgetall(&self, key: &str) -> Option<HashMap<String, String>> {
        if !self.hash_key_live(key) {
            return None;
        }
        let map = self.hashes.get(key)?;
        if map.is_empty() {
            return None;
        }
        Some(map.iter().map(|e| (e.key().clone(), e.value().clone())).collect())
    }

    async fn hdel(&self, key: &str, field: &str) -> bool {
        self.hashes.get(key).map(|map| map.remove(field).is_some()).unwrap_or(false)
    }

    async fn hexists(&self, key: &str, field: &str) -> bool {
        self.hash_key_live(key) && self.hashes.get(key).map(|m| m.contains_key(field)).unwrap_or(false)
    }

    async fn delete(&self, key: &str) -> bool {
        let had_hash = self.hashes.remove(key).is_some();
        let had_string = self.strings.remove(key).is_some();
        self.expirations.remove(key);
        had_hash || had_string
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> bool {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.strings.insert(key.to_string(), ExpiringValue { value, expires_at });
        true
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entry = self.strings.get(key)?;
        if !entry.is_live() {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> bool {
        let has_hash = self.hashes.contains_key(key);
        let has_string = self.strings.contains_key(key);
        if !has_hash && !has_string {
            return false;
        }
        self.expirations.insert(key.to_string(), Instant::now() + ttl);
        true
    }

    async fn publish(&self, channel: &str, message: String) -> bool {
        let tx = self.sender_for(channel);
        // No subscribers is not a failure — best-effort fan-out.
        let _ = tx.send((channel.to_string(), message));
        true
    }

    fn subscribe(&self, channel: &str) -> broadcast::Receiver<(String, String)> {
        self.sender_for(channel).subscribe()
    }

    async fn scan(&self, pattern: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .hashes
            .iter()
            .map(|e| e.key().clone())
            .filter(|k| self.hash_key_live(k))
            .chain(self.strings.iter().filter(|e| e.value().is_live()).map(|e| e.key().clone()))
            .filter(|k| glob_match(pattern, k))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl MemoryStore {
    fn hash_key_live(&self, key: &str) -> bool {
        self.expirations.get(key).map(|at| *at > Instant::now()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.hset("robot:state:m:r1", "status", "WORKING".into()).await);
        assert_eq!(store.hget("robot:state:m:r1", "status").await, Some("WORKING".into()));
        let all = store.hgetall("robot:state:m:r1").await.unwrap();
        assert_eq!(all.get("status"), Some(&"WORKING".to_string()));
    }

    #[tokio::test]
    async fn pubsub_fans_out_to_subscribers() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe("smartfarm");
        assert!(store.publish("smartfarm", "{\"type\":\"start\"}".into()).await);
        let (chan, msg) = rx.recv().await.unwrap();
        assert_eq!(chan, "smartfarm");
        assert_eq!(msg, "{\"type\":\"start\"}");
    }

    #[tokio::test]
    async fn scan_matches_trailing_glob() {
        let store = MemoryStore::new();
        store.hset("robot:state:m:r1", "x", "1".into()).await;
        store.hset("robot:state:m:r2", "x", "1".into()).await;
        store.hset("robot:state:n:r1", "x", "1".into()).await;
        let mut found = store.scan("robot:state:m:*").await;
        found.sort();
        assert_eq!(found, vec!["robot:state:m:r1", "robot:state:m:r2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_hash_key_reads_as_absent() {
        let store = MemoryStore::new();
        store.hset("robot:daily_stats:m:r1:2024-01-01", "working", "10".into()).await;
        store.expire("robot:daily_stats:m:r1:2024-01-01", Duration::from_secs(1)).await;
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.hgetall("robot:daily_stats:m:r1:2024-01-01").await, None);
    }
}
