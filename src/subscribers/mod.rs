//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and,
//! behind the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Bus ──► subscriber listener (spawned by SynchronizerBuilder::build)
//!              │
//!              ▼
//!        SubscriberSet::emit(&Event)
//!              │
//!        ┌─────┴─────┬───────────┐
//!        ▼           ▼           ▼
//!    LogWriter    Metrics     Custom ...
//! ```
//!
//! Subscribers keep receiving events after `wait()` or `close()` (late rejections,
//! a late `CloseRequested`). The workers shut down once every synchronizer handle
//! is dropped and the coordinator has stopped.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
