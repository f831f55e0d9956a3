//! # Broadcast bus for runtime events.
//!
//! Producers (on rejection), the coordinator, `wait`/`close` and the subscriber
//! workers all publish into one [`Bus`]. Receivers are the subscriber listener
//! spawned by the builder and any receiver handed out by `Synchronizer::subscribe()`.
//!
//! ```text
//! produce() ──────┐
//! Coordinator ────┼──► Bus ──┬──► subscriber listener ──► SubscriberSet
//! wait()/close() ─┘          └──► Synchronizer::subscribe()
//! ```
//!
//! Publishing never waits. The ring buffer holds `bus_capacity` events shared by all
//! receivers; a receiver that falls further behind gets `RecvError::Lagged` and loses
//! the oldest events. With no receiver attached, events are simply dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the event broadcast channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Largest ring buffer a bus allocates.
    pub const MAX_CAPACITY: usize = 1 << 16;

    /// Creates a new bus with the given channel capacity, clamped into `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Self::MAX_CAPACITY);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to every current receiver; fire-and-forget.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
