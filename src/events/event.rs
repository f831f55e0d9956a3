//! # Runtime events emitted by the synchronizer.
//!
//! [`EventKind`] groups what can happen into three families:
//! - **Flow events**: rounds moving through the coordinator (emitted, rejected, discarded)
//! - **Shutdown events**: drain/close requests and the coordinator's terminal state
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries the optional metadata (stream index, round number,
//! reason) that a given kind sets.
//!
//! ## Ordering
//! `seq` comes from one process-wide counter. Subscribers run on separate workers, so
//! sort by `seq` when the relative order of events matters.
//!
//! ## Example
//! ```rust
//! use lockstep::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ProduceRejected)
//!     .with_stream(2)
//!     .with_reason("full");
//!
//! assert_eq!(ev.kind, EventKind::ProduceRejected);
//! assert_eq!(ev.stream, Some(2));
//! assert_eq!(ev.reason.as_deref(), Some("full"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Process-wide event counter.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // Subscriber workers
    /// `on_event` panicked; the worker carries on with the next event.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic payload, when it is a string
    SubscriberPanicked,

    /// An event was dropped for one subscriber.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: `subscriber=<name> reason=<full|closed>`
    SubscriberOverflow,

    // Rounds and producers
    /// Coordinator started.
    ///
    /// Sets:
    /// - `reason`: `streams=<n> capacity=<c>`
    Started,

    /// A complete round was written to the sink.
    ///
    /// Sets:
    /// - `round`: 1-based round number
    RoundEmitted,

    /// A `produce` call was rejected.
    ///
    /// Sets:
    /// - `stream`: stream index
    /// - `reason`: `full`, `closed` or `unknown_stream`
    ProduceRejected,

    /// The coordinator stopped while a round was incomplete; popped items were dropped.
    ///
    /// Sets:
    /// - `stream`: index of the stream that had nothing to contribute
    /// - `round`: number the round would have had
    /// - `reason`: how many items were discarded
    PartialRoundDiscarded,

    // Shutdown and terminal states
    /// Graceful drain requested (first `wait` call).
    DrainRequested,

    /// Hard stop requested through `close()`.
    CloseRequested,

    /// Coordinator finished a drain.
    ///
    /// Sets:
    /// - `round`: number of rounds emitted in total
    Drained,

    /// Coordinator stopped because its queues were closed.
    ///
    /// Sets:
    /// - `round`: number of rounds emitted in total
    Stopped,

    /// Coordinator stopped because the sink failed or the coordinator panicked.
    ///
    /// Sets:
    /// - `reason`: error message
    SinkFailed,
}

/// One runtime event. Which optional fields are set depends on [`EventKind`].
#[derive(Clone, Debug)]
pub struct Event {
    /// Position in the process-wide event order.
    pub seq: u64,
    /// When the event was created.
    pub at: SystemTime,
    /// What happened.
    pub kind: EventKind,

    /// Stream index, if applicable.
    pub stream: Option<usize>,
    /// Round number, if applicable.
    pub round: Option<u64>,
    /// Subscriber name (subscriber events only).
    pub subscriber: Option<&'static str>,
    /// Free-form detail (error text, counts, overflow cause).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Stamps a new event of `kind` with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            stream: None,
            round: None,
            subscriber: None,
            reason: None,
        }
    }

    /// Attaches a stream index.
    #[inline]
    pub fn with_stream(mut self, stream: usize) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Attaches a round number.
    #[inline]
    pub fn with_round(mut self, round: u64) -> Self {
        self.round = Some(round);
        self
    }

    /// Attaches free-form detail.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// `SubscriberOverflow` for `subscriber`.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// `SubscriberPanicked` for `subscriber`.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        self.kind == EventKind::SubscriberOverflow
    }

    /// True for the kinds that mark the coordinator's exit.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::Drained | EventKind::Stopped | EventKind::SinkFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::Started);
        let b = Event::new(EventKind::RoundEmitted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_subscriber_overflow_sets_name() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Event::new(EventKind::Drained).is_terminal());
        assert!(Event::new(EventKind::Stopped).is_terminal());
        assert!(!Event::new(EventKind::DrainRequested).is_terminal());
    }
}
