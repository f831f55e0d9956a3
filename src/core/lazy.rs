//! # Lazily started synchronizer.
//!
//! [`LazySynchronizer`] holds a builder until the first call that needs a running
//! coordinator. Until then it reports [`State::Uninitialized`].
//!
//! - `init` is idempotent and safe to call concurrently; exactly one coordinator is started.
//! - `produce` starts the synchronizer on demand.
//! - `wait` on a never-started handle fails with [`SyncError::Uninitialized`].
//! - `close` on a never-started handle is a no-op.

use std::sync::{Mutex, OnceLock, PoisonError};

use super::{builder::SynchronizerBuilder, lifecycle::State, synchronizer::Synchronizer};
use crate::error::SyncError;

/// A [`Synchronizer`] that starts on first use.
pub struct LazySynchronizer {
    builder: Mutex<Option<SynchronizerBuilder>>,
    started: OnceLock<Synchronizer>,
}

impl LazySynchronizer {
    /// Wraps `builder` without starting anything.
    pub fn new(builder: SynchronizerBuilder) -> Self {
        Self {
            builder: Mutex::new(Some(builder)),
            started: OnceLock::new(),
        }
    }

    /// Starts the coordinator if it is not running yet and returns the live handle.
    ///
    /// Returns [`SyncError::NoRuntime`] outside a tokio runtime; the builder is kept
    /// so a later call from inside a runtime can still succeed.
    pub fn init(&self) -> Result<&Synchronizer, SyncError> {
        if let Some(sync) = self.started.get() {
            return Ok(sync);
        }
        tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        let mut slot = self.builder.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sync) = self.started.get() {
            return Ok(sync);
        }
        let builder = slot.take().ok_or(SyncError::Uninitialized)?;
        let sync = builder.build()?;
        Ok(self.started.get_or_init(|| sync))
    }

    /// The live handle, if the synchronizer has been started.
    pub fn get(&self) -> Option<&Synchronizer> {
        self.started.get()
    }

    /// Starts the synchronizer if needed, then behaves like [`Synchronizer::produce`].
    pub fn produce(&self, stream: usize, message: impl Into<String>) -> Result<(), SyncError> {
        self.init()?.produce(stream, message)
    }

    /// Behaves like [`Synchronizer::wait`]; fails if the synchronizer was never started.
    pub async fn wait(&self) -> Result<(), SyncError> {
        match self.started.get() {
            Some(sync) => sync.wait().await,
            None => Err(SyncError::Uninitialized),
        }
    }

    /// Behaves like [`Synchronizer::close`]; does nothing if never started.
    pub fn close(&self) {
        if let Some(sync) = self.started.get() {
            sync.close();
        }
    }

    pub fn state(&self) -> State {
        self.started
            .get()
            .map_or(State::Uninitialized, Synchronizer::state)
    }
}

impl std::fmt::Debug for LazySynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySynchronizer")
            .field("started", &self.started.get())
            .finish()
    }
}
