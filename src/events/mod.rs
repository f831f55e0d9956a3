//! Runtime events and the bus that carries them.
//!
//! - [`Event`] / [`EventKind`]: what happened, with optional stream, round and detail
//! - [`Bus`]: `tokio::sync::broadcast` behind a publish/subscribe facade
//!
//! Who publishes: `Synchronizer::produce` (rejections), the coordinator (rounds and
//! the terminal state), `wait`/`close`, and subscriber workers (overflow, panics).
//! Who listens: the subscriber listener spawned by the builder and any receiver from
//! `Synchronizer::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
