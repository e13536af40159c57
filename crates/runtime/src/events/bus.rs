//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use beyonder_core::GazeAlert;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{DivinationEvent, EffectEvent, NoticeEvent, SyncEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// State sync pushes (resource and ability blobs)
    Sync,
    /// Player-facing skill notices
    Notice,
    /// Danger-sense gaze alerts
    Alert,
    /// Divination reports and interrupted searches
    Divination,
    /// Skill effect hook activity
    Effect,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Sync,
        Topic::Notice,
        Topic::Alert,
        Topic::Divination,
        Topic::Effect,
    ];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Sync(SyncEvent),
    Notice(NoticeEvent),
    Alert(GazeAlert),
    Divination(DivinationEvent),
    Effect(EffectEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Sync(_) => Topic::Sync,
            Event::Notice(_) => Topic::Notice,
            Event::Alert(_) => Topic::Alert,
            Event::Divination(_) => Topic::Divination,
            Event::Effect(_) => Topic::Effect,
        }
    }
}

/// One broadcast channel per topic.
///
/// Channels are created up front and never change, so the bus is a plain
/// shared table and publishing never blocks.
#[derive(Debug)]
struct Channels {
    sync: broadcast::Sender<Event>,
    notice: broadcast::Sender<Event>,
    alert: broadcast::Sender<Event>,
    divination: broadcast::Sender<Event>,
    effect: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Sync => &self.sync,
            Topic::Notice => &self.notice,
            Topic::Alert => &self.alert,
            Topic::Divination => &self.divination,
            Topic::Effect => &self.effect,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
#[derive(Debug, Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                sync: broadcast::channel(capacity).0,
                notice: broadcast::channel(capacity).0,
                alert: broadcast::channel(capacity).0,
                divination: broadcast::channel(capacity).0,
                effect: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Number of live receivers on a topic.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
