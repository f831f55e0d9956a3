//! # Lifecycle state and one-shot shutdown signals.
//!
//! ```text
//! Uninitialized ──init──► Running ──wait()──► Draining ──drain done──► Closed
//!                            │                                          ▲
//!                            └──────────────────close()─────────────────┘
//! ```
//!
//! - The state word is a single `AtomicU8`; every transition is a CAS or swap, so
//!   concurrent `wait`/`close` callers agree on who performed it.
//! - The drain request and the hard stop are one-shot [`CancellationToken`]s shared
//!   with the coordinator; cancelling twice is a no-op.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

/// Observable synchronizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    /// Lazily initialised handle that has not started yet.
    Uninitialized = 0,
    /// Coordinator is running and accepting rounds.
    Running = 1,
    /// A drain was requested; the coordinator stops when no complete round is left.
    Draining = 2,
    /// Queues are closed; nothing more reaches the sink.
    Closed = 3,
}

impl State {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => State::Uninitialized,
            1 => State::Running,
            2 => State::Draining,
            _ => State::Closed,
        }
    }
}

/// One-shot signals shared by the lifecycle controller and the coordinator.
#[derive(Clone, Debug, Default)]
pub(crate) struct Signals {
    /// Drain requested.
    pub(crate) drain: CancellationToken,
    /// Hard stop requested.
    pub(crate) closed: CancellationToken,
    /// Coordinator reached a terminal state.
    pub(crate) done: CancellationToken,
}

impl Signals {
    #[inline]
    pub(crate) fn drain_requested(&self) -> bool {
        self.drain.is_cancelled()
    }
}

/// Lifecycle state machine of a running synchronizer.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
    pub(crate) signals: Signals,
}

impl Lifecycle {
    /// Creates a lifecycle already in [`State::Running`].
    pub(crate) fn running() -> Self {
        Self {
            state: AtomicU8::new(State::Running as u8),
            signals: Signals::default(),
        }
    }

    pub(crate) fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `Running → Draining`. Returns `true` only for the caller that made the transition.
    pub(crate) fn begin_drain(&self) -> bool {
        let won = self
            .state
            .compare_exchange(
                State::Running as u8,
                State::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            self.signals.drain.cancel();
        }
        won
    }

    /// Any state `→ Closed` without signalling the coordinator.
    /// Returns `true` only for the caller that made the transition.
    pub(crate) fn mark_closed(&self) -> bool {
        self.state.swap(State::Closed as u8, Ordering::AcqRel) != State::Closed as u8
    }

    /// [`mark_closed`](Self::mark_closed) followed by the hard-stop signal.
    pub(crate) fn close(&self) -> bool {
        let first = self.mark_closed();
        self.signals.closed.cancel();
        first
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.signals.closed.is_cancelled()
    }
}
