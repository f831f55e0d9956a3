//! # Synchronizer: the lifecycle controller and producer-facing handle.
//!
//! [`Synchronizer`] owns the producer halves of the stream queues, the lifecycle
//! state and the event bus. The coordinator task (spawned by the builder) owns the
//! consumer halves and the sink.
//!
//! ## High-level architecture
//! ```text
//! produce(0, m) ──try_enqueue──► [queue 0] ─┐
//! produce(1, m) ──try_enqueue──► [queue 1] ─┼──► Coordinator ──► Emitter ──► sink
//! produce(N-1,m)──try_enqueue──► [queue N-1]┘        │
//!                                                    └──► Bus (RoundEmitted, Drained, ...)
//!
//! Shutdown paths:
//!   wait()  ─► Running→Draining, drain token ─► coordinator finishes complete rounds
//!           ─► await done ─► close effect (Closed)
//!   close() ─► *→Closed, closed token ─► coordinator stops at once, buffers dropped
//! ```
//!
//! ## Rules
//! - `produce` never blocks and never affects other streams when it fails.
//! - `wait` is idempotent; concurrent callers all await the same drain.
//! - `close` is idempotent and non-blocking.
//! - Handles are cheap to clone; dropping every handle closes the queues, which the
//!   coordinator observes as a normal `Done`.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::{
    builder::SynchronizerBuilder,
    coordinator::{Progress, Termination},
    lifecycle::{Lifecycle, State},
    queue::StreamTx,
};
use crate::{
    core::Config,
    error::SyncError,
    events::{Bus, Event, EventKind},
};

pub(crate) struct Inner {
    pub(crate) cfg: Config,
    pub(crate) queues: Vec<StreamTx>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) bus: Bus,
    pub(crate) progress: Arc<Progress>,
    /// Cancelled when the last handle goes; ends the subscriber listener.
    pub(crate) released: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.released.cancel();
    }
}

/// Handle to a running ordered multi-stream synchronizer.
#[derive(Clone)]
pub struct Synchronizer {
    inner: Arc<Inner>,
}

impl Synchronizer {
    /// Returns a builder for the given configuration.
    pub fn builder(cfg: Config) -> SynchronizerBuilder {
        SynchronizerBuilder::new(cfg)
    }

    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Queues `message` on `stream` without waiting.
    ///
    /// ### Errors
    /// - [`SyncError::CapacityExceeded`] if the stream's queue is full
    /// - [`SyncError::UnknownStream`] if `stream >= streams()`
    /// - [`SyncError::Closed`] after `close()` or a completed `wait()`
    pub fn produce(&self, stream: usize, message: impl Into<String>) -> Result<(), SyncError> {
        let inner = &self.inner;
        if inner.lifecycle.is_closed() {
            self.reject(stream, "closed");
            return Err(SyncError::Closed);
        }
        let Some(queue) = inner.queues.get(stream) else {
            self.reject(stream, "unknown_stream");
            return Err(SyncError::UnknownStream {
                stream,
                streams: inner.queues.len(),
            });
        };

        queue.try_enqueue(message.into()).inspect_err(|e| {
            let reason = match e {
                SyncError::CapacityExceeded { .. } => "full",
                _ => "closed",
            };
            self.reject(stream, reason);
        })
    }

    /// Requests a graceful drain and waits for it to finish.
    ///
    /// Complete rounds already buffered are written; an incomplete trailing round is
    /// discarded. The stop point is best-effort: producers racing with the drain may
    /// or may not make it into the output. Afterwards the synchronizer is closed.
    ///
    /// Calling `wait` again, or concurrently, awaits the same drain.
    ///
    /// ### Errors
    /// [`SyncError::Sink`] if the coordinator stopped because the sink failed.
    pub async fn wait(&self) -> Result<(), SyncError> {
        let lifecycle = &self.inner.lifecycle;
        if lifecycle.begin_drain() {
            self.inner.bus.publish(Event::new(EventKind::DrainRequested));
        }
        lifecycle.signals.done.cancelled().await;
        lifecycle.close();

        match self.termination() {
            Some(Termination::SinkFailed { reason }) | Some(Termination::Panicked { reason }) => {
                Err(SyncError::Sink { reason })
            }
            _ => Ok(()),
        }
    }

    /// Stops the coordinator immediately and discards everything still buffered.
    ///
    /// Idempotent and non-blocking. A round being written at this instant still
    /// completes; nothing after it reaches the sink.
    pub fn close(&self) {
        let lifecycle = &self.inner.lifecycle;
        if lifecycle.mark_closed() {
            self.inner.bus.publish(Event::new(EventKind::CloseRequested));
        }
        lifecycle.signals.closed.cancel();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.inner.lifecycle.state()
    }

    /// Number of streams.
    pub fn streams(&self) -> usize {
        self.inner.queues.len()
    }

    /// Per-stream capacity.
    pub fn capacity(&self) -> usize {
        self.inner.cfg.capacity_clamped()
    }

    /// Messages currently buffered on `stream` (advisory), or `None` for an unknown index.
    pub fn len(&self, stream: usize) -> Option<usize> {
        self.inner.queues.get(stream).map(StreamTx::len)
    }

    /// Number of rounds written to the sink so far.
    pub fn rounds_emitted(&self) -> u64 {
        self.inner.progress.rounds.load(Ordering::Acquire)
    }

    /// The coordinator's terminal state, once it has stopped.
    pub fn termination(&self) -> Option<Termination> {
        self.inner.progress.termination.get().cloned()
    }

    /// Creates a receiver for runtime events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    fn reject(&self, stream: usize, reason: &'static str) {
        self.inner.bus.publish(
            Event::new(EventKind::ProduceRejected)
                .with_stream(stream)
                .with_reason(reason),
        );
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("streams", &self.streams())
            .field("capacity", &self.capacity())
            .field("state", &self.state())
            .field("rounds_emitted", &self.rounds_emitted())
            .finish()
    }
}
