//! # LogWriter: tracing-backed event writer
//!
//! A minimal subscriber that renders incoming [`Event`]s as `tracing` records.
//! Use it for tests or demos; install any `tracing` subscriber to see the output.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO lockstep: [started] streams=3 capacity=512
//! INFO lockstep: [drain-requested]
//! WARN lockstep: [rejected] stream=1 reason=full
//! INFO lockstep: [drained] rounds=4
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that turns every event into a `tracing` record under the `lockstep` target.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Same as `LogWriter::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Started => {
                info!(target: "lockstep", "[started] {reason}");
            }
            EventKind::RoundEmitted => {
                debug!(target: "lockstep", "[round] n={:?}", e.round);
            }
            EventKind::ProduceRejected => {
                warn!(target: "lockstep", "[rejected] stream={:?} reason={reason}", e.stream);
            }
            EventKind::PartialRoundDiscarded => {
                info!(
                    target: "lockstep",
                    "[partial-round-discarded] round={:?} missing_stream={:?} {reason}",
                    e.round, e.stream
                );
            }
            EventKind::DrainRequested => {
                info!(target: "lockstep", "[drain-requested]");
            }
            EventKind::CloseRequested => {
                info!(target: "lockstep", "[close-requested]");
            }
            EventKind::Drained => {
                info!(target: "lockstep", "[drained] rounds={:?}", e.round);
            }
            EventKind::Stopped => {
                info!(target: "lockstep", "[stopped] rounds={:?}", e.round);
            }
            EventKind::SinkFailed => {
                error!(target: "lockstep", "[sink-failed] {reason}");
            }
            EventKind::SubscriberOverflow => {
                warn!(
                    target: "lockstep",
                    "[subscriber-overflow] subscriber={:?} {reason}", e.subscriber
                );
            }
            EventKind::SubscriberPanicked => {
                error!(
                    target: "lockstep",
                    "[subscriber-panicked] subscriber={} info={reason}",
                    e.subscriber.unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
