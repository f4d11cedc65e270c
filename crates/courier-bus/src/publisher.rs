//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{BusEvent, EventFilter, EventTopic};
use crate::subscriber::{Subscription, SubscriptionCounts};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Errors from publishing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus was closed; nothing can be published any more.
    #[error("event bus closed")]
    Closed,
}

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active receivers that were handed the event. Zero is
    /// not an error: the event is simply dropped.
    async fn publish(&self, event: BusEvent) -> Result<usize, BusError>;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Every subscriber sees every event and filters locally.
pub struct InMemoryEventBus {
    /// Broadcast sender; `None` once the bus is closed.
    sender: RwLock<Option<broadcast::Sender<BusEvent>>>,

    /// Active subscription count by topic.
    subscriptions: SubscriptionCounts,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,

    /// Serializes `close` against concurrent `subscribe`.
    lifecycle: Mutex<()>,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: RwLock::new(Some(sender)),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
            lifecycle: Mutex::new(()),
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Subscribing to a closed bus yields a subscription that reports
    /// closure on the first receive.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let _guard = self.lifecycle.lock();

        let receiver = match self.sender.read().as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(1);
                drop(sender);
                receiver
            }
        };

        let topics = tracked_topics(&filter);
        {
            let mut subs = self.subscriptions.write();
            for topic in &topics {
                *subs.entry(*topic).or_insert(0) += 1;
            }
        }

        debug!(topics = ?filter.topics, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), topics)
    }

    /// Get the number of active receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of live subscriptions whose filter covers `topic`.
    #[must_use]
    pub fn subscribers_for(&self, topic: EventTopic) -> usize {
        let subs = self.subscriptions.read();
        let direct = if topic == EventTopic::All {
            0
        } else {
            subs.get(&topic).copied().unwrap_or(0)
        };
        direct + subs.get(&EventTopic::All).copied().unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Close the bus. Subscribers drain what is buffered, then see closure.
    pub fn close(&self) {
        let _guard = self.lifecycle.lock();
        if self.sender.write().take().is_some() {
            info!("Event bus closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: BusEvent) -> Result<usize, BusError> {
        let topic = event.topic();
        let sender = self.sender.read().clone().ok_or(BusError::Closed)?;

        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    topic = ?topic,
                    receivers = receiver_count,
                    "Event published"
                );
                Ok(receiver_count)
            }
            Err(e) => {
                warn!(
                    topic = ?topic,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                Ok(0)
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

/// Topics a filter is counted under for `subscribers_for`.
fn tracked_topics(filter: &EventFilter) -> Vec<EventTopic> {
    if filter.topics.is_empty() || filter.topics.contains(&EventTopic::All) {
        vec![EventTopic::All]
    } else {
        let mut topics = Vec::with_capacity(filter.topics.len());
        for topic in &filter.topics {
            if !topics.contains(topic) {
                topics.push(*topic);
            }
        }
        topics
    }
}
