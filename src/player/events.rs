//! Player event fan-out
//!
//! Subscribers are closures. Each gets its own clone of every event, in
//! subscription order. Dropping an [`EventSubscription`] removes its callback.

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use super::PlayerEvent;

type Callback = Arc<dyn Fn(PlayerEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Distributes player events to subscribers
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it stays registered while the handle lives
    pub fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        let mut subs = self.subscribers.write();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.entries.push((id, Arc::new(callback)));

        EventSubscription {
            id,
            dispatcher: Arc::downgrade(&self.subscribers),
        }
    }

    /// Deliver an event to every subscriber
    pub fn dispatch(&self, event: PlayerEvent) {
        // Callbacks run outside the lock so they may drop their own subscription.
        let callbacks: Vec<Callback> = self
            .subscribers
            .read()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().entries.len()
    }

    /// Drop every subscriber
    pub fn clear(&self) {
        self.subscribers.write().entries.clear();
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Event subscription handle
#[derive(Debug)]
pub struct EventSubscription {
    id: u64,
    dispatcher: Weak<RwLock<Subscribers>>,
}

impl EventSubscription {
    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        self.dispatcher
            .upgrade()
            .map(|subs| subs.read().entries.iter().any(|(id, _)| *id == self.id))
            .unwrap_or(false)
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(subs) = self.dispatcher.upgrade() {
            subs.write().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
