//! The device-bus/broker-event-bus transport abstraction (§6.1). Physical
//! bus transports are out of scope — this is the seam a real MQTT client
//! would slot into, shaped after `dt-spatial::Router`'s
//! trait-for-pluggable-backend idiom. [`InMemoryBus`] is the one
//! implementation the controller ships: an `mpsc` queue for ingress (single
//! consumer, matching the "one receiver task per ingress bus" scheduling
//! model in §5) and a `broadcast` channel for egress, so tests and
//! dashboards can observe published responses without a real broker.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

/// One bus message: a topic and its raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    pub payload: String,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self { topic: topic.into(), payload: payload.into() }
    }
}

#[async_trait]
pub trait InboundBus: Send {
    /// Returns `None` once the bus is closed and drained.
    async fn recv(&mut self) -> Option<Envelope>;
}

#[async_trait]
pub trait OutboundBus: Send + Sync {
    /// Best-effort publish — returns `false` on a broker-unavailable
    /// condition rather than erroring, per §7's `BrokerUnavailable` policy.
    async fn publish(&self, topic: &str, payload: String) -> bool;
}

const DEFAULT_CAPACITY: usize = 1024;

/// The in-memory device/broker-event bus: one `mpsc` sender side that
/// external producers (a real broker client, or a test) push onto, and one
/// `broadcast` sender side that [`OutboundBus::publish`] fans out on.
pub struct InMemoryBus {
    inbound_tx: mpsc::Sender<Envelope>,
    outbound_tx: broadcast::Sender<Envelope>,
}

pub struct InMemoryBusHandle {
    inbound_tx: mpsc::Sender<Envelope>,
}

impl InMemoryBusHandle {
    pub async fn send(&self, envelope: Envelope) -> bool {
        self.inbound_tx.send(envelope).await.is_ok()
    }
}

pub struct InMemoryInbound {
    rx: mpsc::Receiver<Envelope>,
}

#[async_trait]
impl InboundBus for InMemoryInbound {
    async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}

impl InMemoryBus {
    /// Builds the bus plus its ingress receiver in one step — the receiver
    /// is single-consumer, so there is no way to ask for it twice.
    pub fn new(capacity: usize) -> (Self, InMemoryInbound) {
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (outbound_tx, _) = broadcast::channel(capacity);
        (Self { inbound_tx, outbound_tx }, InMemoryInbound { rx: inbound_rx })
    }

    /// A cloneable handle producers use to push inbound messages.
    pub fn handle(&self) -> InMemoryBusHandle {
        InMemoryBusHandle { inbound_tx: self.inbound_tx.clone() }
    }

    /// Observe published (egress) messages — used by tests and, in a real
    /// deployment, by whatever bridges this bus to the physical broker.
    pub fn subscribe_outbound(&self) -> broadcast::Receiver<Envelope> {
        self.outbound_tx.subscribe()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY).0
    }
}

#[async_trait]
impl OutboundBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: String) -> bool {
        // No subscribers is not a failure — best-effort fan-out, matching
        // `MemoryStore::publish`.
        let _ = self.outbound_tx.send(Envelope::new(topic, payload));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inbound_roundtrips_through_handle() {
        let (bus, mut inbound) = InMemoryBus::new(8);
        let handle = bus.handle();
        assert!(handle.send(Envelope::new("a/b/robot/arrive", "{}")).await);
        let got = inbound.recv().await.unwrap();
        assert_eq!(got.topic, "a/b/robot/arrive");
    }

    #[tokio::test]
    async fn outbound_publish_reaches_subscriber() {
        let (bus, _inbound) = InMemoryBus::new(8);
        let mut rx = bus.subscribe_outbound();
        assert!(bus.publish("a/b/server/path_plan", "{\"path\":\"x\"}".into()).await);
        let got = rx.recv().await.unwrap();
        assert_eq!(got.topic, "a/b/server/path_plan");
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_not_a_failure() {
        let (bus, _inbound) = InMemoryBus::new(8);
        assert!(bus.publish("a/b/server/path_plan", "{}".into()).await);
    }
}
