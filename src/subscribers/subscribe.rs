//! # The subscriber extension point.
//!
//! Implement [`Subscribe`] to observe a synchronizer: count rounds, alert on
//! rejected produces, forward terminal states to a supervisor, and so on.
//!
//! Handlers run on a worker task owned by [`SubscriberSet`](crate::SubscriberSet),
//! one per subscriber, fed through a bounded queue of
//! [`queue_capacity`](Subscribe::queue_capacity) events. When that queue is full the
//! event is dropped for this subscriber only and a `SubscriberOverflow` event is
//! published. A panic in `on_event` is reported as `SubscriberPanicked` and the worker
//! moves on to the next event.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use lockstep::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct Rejections(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for Rejections {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ProduceRejected {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "rejections" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of synchronizer events.
///
/// `on_event` should not block the executor; do slow work asynchronously.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Never called from a producer or the coordinator.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow` / `SubscriberPanicked` events.
    /// Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Size of this subscriber's queue (at least 1 is used). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
