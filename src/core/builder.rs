use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::{
    coordinator::{Coordinator, Progress},
    emitter::{BoxSink, Emitter},
    lifecycle::Lifecycle,
    queue,
    synchronizer::{Inner, Synchronizer},
};
use crate::{
    core::Config,
    error::SyncError,
    events::{Bus, Event, EventKind},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Synchronizer`] with an optional sink and subscribers.
pub struct SynchronizerBuilder {
    cfg: Config,
    sink: Option<BoxSink>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SynchronizerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            sink: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the output destination (default: stdout).
    pub fn with_sink<W>(mut self, sink: W) -> Self
    where
        W: tokio::io::AsyncWrite + Send + Unpin + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the synchronizer and starts its coordinator.
    ///
    /// Initializes all runtime components:
    /// - Event bus and subscriber workers
    /// - One bounded queue per stream
    /// - The coordinator task
    ///
    /// Returns [`SyncError::NoRuntime`] when called outside a tokio runtime.
    pub fn build(self) -> Result<Synchronizer, SyncError> {
        let rt = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        let streams = self.cfg.streams_clamped();
        let capacity = self.cfg.capacity_clamped();
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let lifecycle = Lifecycle::running();
        let progress = Arc::new(Progress::default());
        let released = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(
                &rt,
                &bus,
                subs,
                released.clone(),
                lifecycle.signals.done.clone(),
            );
        }

        let (txs, rxs): (Vec<_>, Vec<_>) =
            (0..streams).map(|i| queue::channel(i, capacity)).unzip();
        let sink = self.sink.unwrap_or_else(|| Box::new(tokio::io::stdout()));

        let coordinator = Coordinator::new(
            rxs,
            Emitter::new(sink),
            lifecycle.signals.clone(),
            bus.clone(),
            progress.clone(),
        );
        rt.spawn(coordinator.run());

        bus.publish(
            Event::new(EventKind::Started)
                .with_reason(format!("streams={streams} capacity={capacity}")),
        );

        Ok(Synchronizer::from_inner(Inner {
            cfg: self.cfg,
            queues: txs,
            lifecycle,
            bus,
            progress,
            released,
        }))
    }
}

/// Subscribes to the bus and forwards events to the subscriber set.
///
/// Forwarding outlives the coordinator: rejections and late `close()` calls are
/// still delivered. Once every handle is dropped (`released`) and the coordinator
/// is done, the remaining buffered events are forwarded and the subscriber
/// workers are shut down.
fn subscriber_listener(
    rt: &tokio::runtime::Handle,
    bus: &Bus,
    set: SubscriberSet,
    released: CancellationToken,
    done: CancellationToken,
) {
    let mut rx = bus.subscribe();
    rt.spawn(async move {
        let finished = async move {
            released.cancelled().await;
            done.cancelled().await;
        };
        tokio::pin!(finished);

        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                () = &mut finished => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    });
}
