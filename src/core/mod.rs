//! Runtime core: queues, coordinator and lifecycle.
//!
//! The public API from this module is [`Synchronizer`] (plus its builder and the
//! lazily started variant). Everything else is wiring between the handle and the
//! coordinator task.
//!
//! Internal modules:
//! - [`queue`]: bounded per-stream queues and the coordinator's blocking pop;
//! - [`coordinator`]: the round loop, drain heuristic and terminal state;
//! - [`emitter`]: writes one round to the sink in a single write;
//! - [`lifecycle`]: state word and the drain/close/done signals;
//! - [`synchronizer`]: producer-facing handle (`produce`, `wait`, `close`);
//! - [`lazy`]: deferred start.

mod builder;
mod config;
mod coordinator;
mod emitter;
mod lazy;
mod lifecycle;
mod queue;
mod sink;
mod synchronizer;

pub use builder::SynchronizerBuilder;
pub use config::Config;
pub use coordinator::Termination;
pub use emitter::BoxSink;
pub use lazy::LazySynchronizer;
pub use lifecycle::State;
pub use sink::MemorySink;
pub use synchronizer::Synchronizer;
