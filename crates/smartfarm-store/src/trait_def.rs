//! The [`Store`] trait — the abstract key/value capability every higher
//! component is built on (component C1). Mirrors `dt-output::OutputWriter`'s
//! trait-plus-swappable-backend idiom, generalised to async since a real
//! backing store (Redis, in the source) is a network collaborator.
//!
//! Connection loss is tolerated by contract: every mutator returns a
//! boolean success rather than an error; readers return `None`/empty on
//! failure. Messages are best-effort — no persistence, no cross-channel
//! ordering guarantee.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

#[async_trait]
pub trait Store: Send + Sync {
    async fn hget(&self, key: &str, field: &str) -> Option<String>;
    async fn hset(&self, key: &str, field: &str, value: String) -> bool;
    async fn hgetall(&self, key: &str) -> Option<HashMap<String, String>>;
    async fn hdel(&self, key: &str, field: &str) -> bool;
    async fn hexists(&self, key: &str, field: &str) -> bool;
    async fn delete(&self, key: &str) -> bool;

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> bool;
    async fn get(&self, key: &str) -> Option<String>;
    async fn expire(&self, key: &str, ttl: Duration) -> bool;

    async fn publish(&self, channel: &str, message: String) -> bool;
    /// Subscribes to an exact channel name. The source's `SCAN`/pub-sub
    /// patterns are Redis glob patterns over keys, not channels — channel
    /// subscriptions in the source are always literal topic names, so no
    /// glob matching is needed here.
    fn subscribe(&self, channel: &str) -> broadcast::Receiver<(String, String)>;

    /// Keys matching a simple glob `pattern` (`*` wildcard, any number of
    /// occurrences) — the Rust analogue of Redis `SCAN MATCH`.
    async fn scan(&self, pattern: &str) -> Vec<String>;
}
