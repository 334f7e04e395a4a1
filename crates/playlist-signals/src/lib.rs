//! Signal bus for playlist actions
//!
//! This crate provides the SignalBus, a small pub/sub broker keyed by signal
//! name. Actions that wait on something outside the playlist (a user clicking
//! "next", another branch reaching a point) subscribe to a name; whoever
//! observes the event publishes a `complete` or `fail` signal under it.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default channel capacity for signal subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// What a signal tells its listeners to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalKind {
    /// Listeners should complete with this payload
    Complete {
        #[serde(default)]
        payload: Value,
    },
    /// Listeners should fail with this reason
    Fail { reason: String },
}

/// A named signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Signal name (e.g., "tour.next")
    pub name: String,
    /// Outcome carried by the signal
    #[serde(flatten)]
    pub kind: SignalKind,
}

impl Signal {
    /// Create a completion signal
    pub fn complete(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            kind: SignalKind::Complete { payload },
        }
    }

    /// Create a failure signal
    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SignalKind::Fail {
                reason: reason.into(),
            },
        }
    }
}

/// The signal bus for publishing and subscribing to named signals
///
/// Signals are not retained: a signal published while nobody is subscribed
/// to its name is dropped.
pub struct SignalBus {
    /// Map of signal names to their broadcast senders
    channels: DashMap<String, broadcast::Sender<Signal>>,
    /// Channel capacity
    capacity: usize,
}

impl SignalBus {
    /// Create a new signal bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new signal bus with specified channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to signals with the given name
    ///
    /// Channels whose subscribers are all gone are dropped here and on
    /// [`SignalBus::emit`], so the map only holds names someone listens to.
    pub fn subscribe(&self, name: impl Into<String>) -> broadcast::Receiver<Signal> {
        let name = name.into();
        trace!(signal = %name, "Subscribing to signal");

        self.channels.retain(|_, sender| sender.receiver_count() > 0);
        self.channels
            .entry(name)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            })
            .subscribe()
    }

    /// Publish a signal to every current subscriber of its name
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&self, signal: Signal) -> usize {
        debug!(signal = %signal.name, "Emitting signal");
        let name = signal.name.clone();

        let delivered = match self.channels.get(&name) {
            // A send error only means there are no active receivers
            Some(sender) => sender.send(signal).unwrap_or(0),
            None => 0,
        };

        self.channels
            .remove_if(&name, |_, sender| sender.receiver_count() == 0);
        delivered
    }

    /// Publish a completion signal
    pub fn complete(&self, name: impl Into<String>, payload: Value) -> usize {
        self.emit(Signal::complete(name, payload))
    }

    /// Publish a failure signal
    pub fn fail(&self, name: impl Into<String>, reason: impl Into<String>) -> usize {
        self.emit(Signal::fail(name, reason))
    }

    /// Number of live subscribers for a name
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.channels
            .get(name)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Number of signal names with a channel
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for SignalBus
pub type SharedSignalBus = Arc<SignalBus>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribe_and_complete() {
        let bus = SignalBus::new();
        let mut rx = bus.subscribe("tour.next");

        assert_eq!(bus.complete("tour.next", json!({"step": 2})), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.name, "tour.next");
        assert_eq!(
            received.kind,
            SignalKind::Complete {
                payload: json!({"step": 2})
            }
        );
    }

    #[tokio::test]
    async fn test_fail_signal() {
        let bus = SignalBus::new();
        let mut rx = bus.subscribe("tour.abort");

        bus.fail("tour.abort", "user closed the tour");

        let received = rx.recv().await.unwrap();
        assert_eq!(
            received.kind,
            SignalKind::Fail {
                reason: "user closed the tour".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = SignalBus::new();
        let mut rx1 = bus.subscribe("ready");
        let mut rx2 = bus.subscribe("ready");

        assert_eq!(bus.subscriber_count("ready"), 2);
        bus.complete("ready", json!(1));

        assert_eq!(rx1.recv().await.unwrap().name, "ready");
        assert_eq!(rx2.recv().await.unwrap().name, "ready");
    }

    #[test]
    fn test_no_cross_signal_pollution() {
        let bus = SignalBus::new();
        let mut rx_a = bus.subscribe("a");
        let _rx_b = bus.subscribe("b");

        bus.complete("b", Value::Null);
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = SignalBus::new();
        assert_eq!(bus.complete("nobody", Value::Null), 0);

        let rx = bus.subscribe("gone");
        drop(rx);
        assert_eq!(bus.subscriber_count("gone"), 0);
        assert_eq!(bus.complete("gone", Value::Null), 0);
        assert_eq!(bus.channel_count(), 0);
    }

    #[test]
    fn test_abandoned_channels_are_dropped() {
        let bus = SignalBus::new();
        for i in 0..100 {
            drop(bus.subscribe(format!("step.{i}")));
        }
        let _live = bus.subscribe("step.last");
        assert_eq!(bus.channel_count(), 1);

        // A channel with listeners survives an emit
        bus.complete("step.last", Value::Null);
        assert_eq!(bus.channel_count(), 1);
        assert_eq!(bus.subscriber_count("step.last"), 1);
    }

    #[test]
    fn test_signal_serde() {
        let signal: Signal = serde_json::from_value(json!({
            "name": "tour.next",
            "kind": "complete",
            "payload": {"ok": true}
        }))
        .unwrap();
        assert_eq!(signal, Signal::complete("tour.next", json!({"ok": true})));

        let value = serde_json::to_value(Signal::fail("x", "boom")).unwrap();
        assert_eq!(value, json!({"name": "x", "kind": "fail", "reason": "boom"}));
    }
}
