//! [`ConnectionTracker`] — component C9. Parses broker connect/disconnect
//! events into a per-client presence record, grounded in full on
//! `original_source/app/util/mqtt/handlers/connection.py`.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Deserialize;
use smartfarm_store::Store;
use tracing::{info, warn};

use crate::keys::connection_key;
use crate::transport::{Envelope, InboundBus};

/// The four hyphen-delimited segments of a client id, e.g.
/// `sensor-smartfarm_x-42-8f3a...`. `uuid` itself contains hyphens, so the
/// split takes only the first three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClientId {
    pub device: String,
    pub map_name: String,
    pub device_id: String,
    pub uuid: String,
}

pub fn parse_client_id(raw: &str) -> Option<ParsedClientId> {
    let parts: Vec<&str> = raw.splitn(4, '-').collect();
    if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(ParsedClientId {
        device: parts[0].to_string(),
        map_name: parts[1].to_string(),
        device_id: parts[2].to_string(),
        uuid: parts[3].to_string(),
    })
}

#[derive(Deserialize)]
struct ClientEventPayload {
    #[serde(rename = "clientid")]
    client_id: String,
    #[serde(rename = "ipaddress")]
    ip_address: Option<String>,
}

pub struct ConnectionTracker<S: Store> {
    store: Arc<S>,
}

impl<S: Store> ConnectionTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn handle_connected(&self, client_id: &str, ip_address: &str, now: DateTime<Local>) -> bool {
        let Some(id) = parse_client_id(client_id) else {
            warn!(client_id, "malformed client id on connect, dropping");
            return false;
        };
        let key = connection_key(&id.device, &id.map_name, &id.device_id);
        self.store.hset(&key, "device", id.device.clone()).await;
        self.store.hset(&key, "map_name", id.map_name.clone()).await;
        self.store.hset(&key, "device_id", id.device_id.clone()).await;
        self.store.hset(&key, "uuid", id.uuid.clone()).await;
        self.store.hset(&key, "ip", ip_address.to_string()).await;
        self.store.hset(&key, "connected_at", now.to_rfc3339()).await;
        self.store.hdel(&key, "disconnected_at").await;
        self.store.hdel(&key, "reason").await;
        info!(device = id.device, map = id.map_name, device_id = id.device_id, ip = ip_address, "client connected");
        true
    }

    pub async fn handle_disconnected(&self, client_id: &str) -> bool {
        let Some(id) = parse_client_id(client_id) else {
            warn!(client_id, "malformed client id on disconnect, dropping");
            return false;
        };
        let key = connection_key(&id.device, &id.map_name, &id.device_id);
        let removed = self.store.delete(&key).await;
        info!(device = id.device, map = id.map_name, device_id = id.device_id, "client disconnected");
        removed
    }

    async fn handle_envelope(&self, envelope: Envelope, now: DateTime<Local>) {
        let Ok(payload) = serde_json::from_str::<ClientEventPayload>(&envelope.payload) else {
            warn!(topic = envelope.topic, "malformed broker event payload, dropping");
            return;
        };
        match envelope.topic.as_str() {
            crate::keys::CONNECTED_TOPIC => {
                let ip = payload.ip_address.as_deref().unwrap_or("Unknown");
                self.handle_connected(&payload.client_id, ip, now).await;
            }
            crate::keys::DISCONNECTED_TOPIC => {
                self.handle_disconnected(&payload.client_id).await;
            }
            other => warn!(topic = other, "unrecognised broker-event topic, dropping"),
        }
    }

    /// The broker-event-bus receive loop (§5: one receiver task per
    /// ingress bus). Runs until the bus closes.
    pub async fn run<B: InboundBus>(&self, mut inbound: B) {
        info!("connection tracker started");
        while let Some(envelope) = inbound.recv().await {
            self.handle_envelope(envelope, Local::now()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_store::MemoryStore;

    #[test]
    fn parses_four_segments_keeping_uuid_hyphens_intact() {
        let id = parse_client_id("sensor-smartfarm_x-42-8f3a-11").unwrap();
        assert_eq!(id.device, "sensor");
        assert_eq!(id.map_name, "smartfarm_x");
        assert_eq!(id.device_id, "42");
        assert_eq!(id.uuid, "8f3a-11");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(parse_client_id("sensor-smartfarm_x-42").is_none());
        assert!(parse_client_id("sensor--42-uuid").is_none());
    }

    #[tokio::test]
    async fn connect_then_disconnect_roundtrips() {
        let store = Arc::new(MemoryStore::new());
        let tracker = ConnectionTracker::new(store.clone());
        let client_id = "sensor-smartfarm_x-42-8f3a-11";

        assert!(tracker.handle_connected(client_id, "10.0.0.5", Local::now()).await);
        let key = connection_key("sensor", "smartfarm_x", "42");
        assert!(store.hexists(&key, "connected_at").await);
        assert_eq!(store.hgetall(&key).await.unwrap().get("ip").map(String::as_str), Some("10.0.0.5"));

        assert!(tracker.handle_disconnected(client_id).await);
        assert!(store.hgetall(&key).await.is_none());
    }

    #[tokio::test]
    async fn malformed_client_id_is_rejected_without_panicking() {
        let store = Arc::new(MemoryStore::new());
        let tracker = ConnectionTracker::new(store);
        assert!(!tracker.handle_connected("bad-id", "10.0.0.5", Local::now()).await);
    }
}
