//! # Fan-out of runtime events to subscriber workers.
//!
//! [`SubscriberSet`] gives every subscriber its own bounded lane and worker task, so
//! a slow or panicking subscriber never holds up the coordinator or its peers.
//!
//! ```text
//! emit(&event) ─► Arc<Event>
//!     ├──► lane "log"     ──► worker ──► on_event()
//!     ├──► lane "metrics" ──► worker ──► on_event() ──panic──► SubscriberPanicked
//!     └──► lane "audit"   ──► full   ──► SubscriberOverflow (event dropped for "audit")
//! ```
//!
//! Each lane is FIFO; there is no ordering between lanes. `emit` only ever calls
//! `try_send`. A panic inside `on_event` is caught with `AssertUnwindSafe`, so
//! state behind a lock the subscriber held at that moment may be left inconsistent.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::Config;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Sending side of one subscriber's queue.
struct Lane {
    subscriber: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out over a fixed list of subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber; panics of `on_event` are reported on `bus`.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, workers) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().clamp(1, Config::MAX_CAPACITY));
                let lane = Lane {
                    subscriber: sub.name(),
                    tx,
                };
                (lane, spawn_worker(sub, rx, bus.clone()))
            })
            .unzip();

        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Hands `event` to every lane without waiting.
    ///
    /// A full or closed lane drops the event for that subscriber and publishes
    /// `SubscriberOverflow` (`reason` is `full` or `closed`). Overflow events are
    /// never re-reported, so a saturated lane cannot feed itself.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&shared)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            if !shared.is_subscriber_overflow() {
                self.bus
                    .publish(Event::subscriber_overflow(lane.subscriber, reason));
            }
        }
    }

    /// Closes every lane and waits until each worker has processed what it holds.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

fn spawn_worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    bus: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let delivered = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
            if let Err(payload) = delivered {
                bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*payload)));
            }
        }
    })
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    match payload.downcast_ref::<&'static str>() {
        Some(msg) => (*msg).to_owned(),
        None => payload
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown panic".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _ev: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _ev: &Event) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_events() {
        let bus = Bus::new(16);
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        let subs: Vec<Arc<dyn Subscribe>> = vec![a.clone(), b.clone()];
        let set = SubscriberSet::new(subs, bus);
        assert_eq!(set.len(), 2);

        for round in 1..=3 {
            set.emit(&Event::new(EventKind::RoundEmitted).with_round(round));
        }
        set.shutdown().await;

        assert_eq!(a.0.load(Ordering::SeqCst), 3);
        assert_eq!(b.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_panic_is_reported_on_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Exploder)];
        let set = SubscriberSet::new(subs, bus);

        set.emit(&Event::new(EventKind::Started));
        set.shutdown().await;

        let ev = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.subscriber, Some("exploder"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
