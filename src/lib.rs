//! # lockstep
//!
//! **Lockstep** is an ordered multi-stream synchronizer for tokio.
//!
//! Any number of producers push messages onto `N` independent streams. A single
//! coordinator interleaves them into **rounds** (one message from stream 0, then
//! stream 1, ..., then stream `N-1`) and writes each complete round to a sink, one
//! message per line. Per-stream order is preserved; rounds are never mixed.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  producer A      producer B      producer C
//!      │ produce(0, m)  │ produce(2, m)  │ produce(1, m)
//!      ▼                ▼                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Synchronizer (cloneable handle)                                  │
//! │  - one bounded queue per stream (try_send, never blocks)          │
//! │  - Lifecycle (Running → Draining → Closed)                        │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!    [queue 0]          [queue 1]   ...   [queue N-1]
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!              ┌─────────────────────────┐
//!              │  Coordinator (1 task)   │──► Emitter ──► sink (stdout by default)
//!              │  round = [q0, q1, ...]  │
//!              └────────────┬────────────┘
//!                           │ Publishes: RoundEmitted, PartialRoundDiscarded,
//!                           │            Drained, Stopped, SinkFailed
//!                           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                   (capacity: Config::bus_capacity)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                     worker1    worker2    workerN
//! ```
//!
//! ### Shutdown
//! ```text
//! wait()  ─► Draining ─► coordinator writes the complete rounds it can still form
//!         ─► first missing item (best effort) ─► Drained ─► Closed
//! close() ─► Closed   ─► coordinator stops at its next pop, buffers dropped
//! every handle dropped ─► queues closed ─► Stopped
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Synchronizer**  | Produce, drain, close; lazily started variant.                | [`Synchronizer`], [`LazySynchronizer`]      |
//! | **Configuration** | Stream count and capacities, clamped to tokio's limits.       | [`Config`], [`SynchronizerBuilder`]         |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom).          | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**        | Typed errors for producers and shutdown.                      | [`SyncError`]                               |
//! | **Sinks**         | Any `AsyncWrite`; an in-memory sink for tests.                | [`MemorySink`], [`BoxSink`]                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] backed by `tracing`.
//! - `fetch` _(default)_: concurrent HTTP fetching with cancel-on-first-failure.
//! - `access-log` _(default)_: access log parsing, request counting and table rendering.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use lockstep::{Config, MemorySink, Synchronizer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn lockstep::Subscribe>> = vec![Arc::new(lockstep::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn lockstep::Subscribe>> = Vec::new();
//!
//!     let sink = MemorySink::new();
//!     let sync = Synchronizer::builder(Config::default())
//!         .with_sink(sink.clone())
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     let producers: Vec<_> = (0..3)
//!         .map(|stream| {
//!             let sync = sync.clone();
//!             tokio::spawn(async move {
//!                 for round in 0..2 {
//!                     sync.produce(stream, format!("s{stream}r{round}"))?;
//!                 }
//!                 Ok::<_, lockstep::SyncError>(())
//!             })
//!         })
//!         .collect();
//!     for p in producers {
//!         p.await??;
//!     }
//!
//!     sync.wait().await?;
//!     assert_eq!(sink.lines(), ["s0r0", "s1r0", "s2r0", "s0r1", "s1r1", "s2r1"]);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    BoxSink, Config, LazySynchronizer, MemorySink, State, Synchronizer, SynchronizerBuilder,
    Termination,
};
pub use error::SyncError;
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

// Optional collaborators, enabled by default.
#[cfg(feature = "access-log")]
pub mod access_log;
#[cfg(feature = "fetch")]
pub mod fetch;
