//! # Coordinator: the single consumer of every stream queue.
//!
//! Runs on one dedicated tokio task from construction until a terminal state.
//!
//! ## Round loop
//! ```text
//! loop {
//!   for i in 0..N {
//!     ├─► i > 0 && drain requested && queue[i] empty ─► Drained (drop partial round)
//!     └─► dequeue(queue[i])
//!           ├─ Item    ─► push into round
//!           ├─ Closed  ─► Done
//!           └─ Drained ─► Drained (drop partial round)
//!   }
//!   ├─► emitter.emit(round)          (sink error ─► SinkFailed)
//!   ├─► publish RoundEmitted
//!   └─► drain requested && queue[0] empty ─► Drained
//! }
//! ```
//!
//! ## Best-effort drain
//! The emptiness checks race with producers: an item enqueued just after a check
//! is not waited for, and an item enqueued just before one is still consumed. A
//! drain may therefore stop slightly early or slightly late relative to the
//! `wait()` call. Only complete rounds are ever written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use futures::FutureExt;

use crate::core::emitter::Emitter;
use crate::core::lifecycle::Signals;
use crate::core::queue::{Dequeued, StreamRx};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;

/// Terminal state of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// A queue was closed (hard stop, or every handle dropped).
    Done,
    /// The drain heuristic found no further complete round.
    Drained,
    /// Writing to the sink failed.
    SinkFailed {
        /// I/O error message.
        reason: String,
    },
    /// The coordinator panicked.
    Panicked {
        /// Panic message.
        reason: String,
    },
}

impl Termination {
    /// True for the two normal outcomes (`Done`, `Drained`).
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::Done | Termination::Drained)
    }
}

/// State shared between the coordinator and its handles.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    pub(crate) rounds: AtomicU64,
    pub(crate) termination: OnceLock<Termination>,
}

pub(crate) struct Coordinator {
    queues: Vec<StreamRx>,
    emitter: Emitter,
    signals: Signals,
    bus: Bus,
    progress: Arc<Progress>,
}

impl Coordinator {
    pub(crate) fn new(
        queues: Vec<StreamRx>,
        emitter: Emitter,
        signals: Signals,
        bus: Bus,
        progress: Arc<Progress>,
    ) -> Self {
        Self {
            queues,
            emitter,
            signals,
            bus,
            progress,
        }
    }

    /// Drives rounds until a terminal state, records it, then fires `done`.
    ///
    /// Queues are dropped on return, discarding anything still buffered.
    pub(crate) async fn run(mut self) {
        let drive = std::panic::AssertUnwindSafe(self.drive()).catch_unwind();
        let termination = match drive.await {
            Ok(t) => t,
            Err(panic_err) => Termination::Panicked {
                reason: panic_message(&*panic_err),
            },
        };

        let rounds = self.progress.rounds.load(Ordering::Acquire);
        let ev = match &termination {
            Termination::Done => Event::new(EventKind::Stopped).with_round(rounds),
            Termination::Drained => Event::new(EventKind::Drained).with_round(rounds),
            Termination::SinkFailed { reason } | Termination::Panicked { reason } => {
                Event::new(EventKind::SinkFailed).with_reason(reason.as_str())
            }
        };
        let _ = self.progress.termination.set(termination);
        self.bus.publish(ev);

        drop(self.queues);
        self.signals.done.cancel();
    }

    async fn drive(&mut self) -> Termination {
        let n = self.queues.len();
        let mut round: Vec<String> = Vec::with_capacity(n);

        loop {
            round.clear();

            for i in 0..n {
                if i > 0 && self.signals.drain_requested() && self.queues[i].is_empty() {
                    self.discard_partial(i, round.len());
                    return Termination::Drained;
                }
                match self.queues[i].dequeue(&self.signals).await {
                    Dequeued::Item(item) => round.push(item),
                    Dequeued::Closed => return Termination::Done,
                    Dequeued::Drained => {
                        self.discard_partial(i, round.len());
                        return Termination::Drained;
                    }
                }
            }

            if let Err(e) = self.emitter.emit(&round).await {
                return Termination::SinkFailed {
                    reason: e.to_string(),
                };
            }
            let emitted = self.progress.rounds.fetch_add(1, Ordering::AcqRel) + 1;
            self.bus
                .publish(Event::new(EventKind::RoundEmitted).with_round(emitted));

            if self.signals.drain_requested() && self.queues[0].is_empty() {
                return Termination::Drained;
            }
        }
    }

    /// Reports a round abandoned at stream `missing` with `taken` items already popped.
    fn discard_partial(&self, missing: usize, taken: usize) {
        if taken == 0 {
            return;
        }
        let next = self.progress.rounds.load(Ordering::Acquire) + 1;
        self.bus.publish(
            Event::new(EventKind::PartialRoundDiscarded)
                .with_stream(self.queues[missing].index())
                .with_round(next)
                .with_reason(format!("discarded={taken}")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue::{StreamTx, channel};
    use crate::core::sink::MemorySink;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::AsyncWrite;

    struct Harness {
        txs: Vec<StreamTx>,
        signals: Signals,
        progress: Arc<Progress>,
        coordinator: Coordinator,
    }

    fn harness(streams: usize, sink: crate::core::emitter::BoxSink) -> Harness {
        let (txs, rxs): (Vec<_>, Vec<_>) = (0..streams).map(|i| channel(i, 16)).unzip();
        let signals = Signals::default();
        let progress = Arc::new(Progress::default());
        let coordinator = Coordinator::new(
            rxs,
            Emitter::new(sink),
            signals.clone(),
            Bus::new(64),
            progress.clone(),
        );
        Harness {
            txs,
            signals,
            progress,
            coordinator,
        }
    }

    struct BrokenSink;

    impl AsyncWrite for BrokenSink {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _data: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")))
        }
        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_generalizes_to_n_streams() {
        let sink = MemorySink::new();
        let h = harness(5, Box::new(sink.clone()));
        for round in ["a", "b"] {
            for (i, tx) in h.txs.iter().enumerate().rev() {
                tx.try_enqueue(format!("{round}{i}")).unwrap();
            }
        }
        h.signals.drain.cancel();
        h.coordinator.run().await;

        assert_eq!(
            sink.contents(),
            "a0\na1\na2\na3\na4\nb0\nb1\nb2\nb3\nb4\n"
        );
        assert_eq!(h.progress.rounds.load(Ordering::SeqCst), 2);
        assert_eq!(h.progress.termination.get(), Some(&Termination::Drained));
        assert!(h.signals.done.is_cancelled());
    }

    #[tokio::test]
    async fn test_producers_gone_means_done() {
        let sink = MemorySink::new();
        let h = harness(2, Box::new(sink.clone()));
        h.txs[0].try_enqueue("x".into()).unwrap();
        h.txs[1].try_enqueue("y".into()).unwrap();
        drop(h.txs);
        h.coordinator.run().await;

        assert_eq!(sink.contents(), "x\ny\n");
        assert_eq!(h.progress.termination.get(), Some(&Termination::Done));
    }

    #[tokio::test]
    async fn test_sink_failure_terminates() {
        let h = harness(1, Box::new(BrokenSink));
        h.txs[0].try_enqueue("x".into()).unwrap();
        h.coordinator.run().await;

        match h.progress.termination.get() {
            Some(Termination::SinkFailed { reason }) => assert!(reason.contains("pipe closed")),
            other => panic!("unexpected termination: {other:?}"),
        }
        assert_eq!(h.progress.rounds.load(Ordering::SeqCst), 0);
    }

    // Exercises the best-effort drain heuristic: with no concurrent producers the
    // advisory check deterministically abandons the incomplete second round.
    #[tokio::test]
    async fn test_drain_abandons_incomplete_round() {
        let sink = MemorySink::new();
        let h = harness(3, Box::new(sink.clone()));
        let mut rx = h.coordinator.bus.subscribe();
        h.txs[2].try_enqueue("three".into()).unwrap();
        h.txs[0].try_enqueue("one".into()).unwrap();
        h.txs[1].try_enqueue("two".into()).unwrap();
        h.txs[0].try_enqueue("1".into()).unwrap();
        h.txs[1].try_enqueue("2".into()).unwrap();
        h.signals.drain.cancel();
        h.coordinator.run().await;

        assert_eq!(sink.contents(), "one\ntwo\nthree\n");
        assert_eq!(h.progress.termination.get(), Some(&Termination::Drained));

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push((ev.kind, ev.stream, ev.round));
        }
        assert_eq!(
            kinds,
            vec![
                (EventKind::RoundEmitted, None, Some(1)),
                (EventKind::PartialRoundDiscarded, Some(2), Some(2)),
                (EventKind::Drained, None, Some(1)),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_wins_over_buffered_items() {
        let sink = MemorySink::new();
        let h = harness(2, Box::new(sink.clone()));
        h.txs[0].try_enqueue("x".into()).unwrap();
        h.txs[1].try_enqueue("y".into()).unwrap();
        h.signals.closed.cancel();
        h.coordinator.run().await;

        assert!(sink.is_empty());
        assert_eq!(h.progress.termination.get(), Some(&Termination::Done));
        assert_eq!(h.txs[0].try_enqueue("z".into()), Err(crate::SyncError::Closed));
    }
}
