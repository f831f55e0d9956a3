//! # Bounded per-stream queue.
//!
//! Each stream owns one bounded tokio `mpsc` channel, split into a producer half
//! ([`StreamTx`], shared by any number of producers) and a consumer half
//! ([`StreamRx`], owned by the coordinator).
//!
//! ## Rules
//! - `try_enqueue` never blocks: it succeeds or fails with `CapacityExceeded`/`Closed`.
//! - A failed enqueue leaves the buffered items untouched.
//! - `dequeue` is the only suspension point of the coordinator.
//! - `len`/`is_empty` are **advisory**: a producer may enqueue right after the check.

use tokio::sync::mpsc;

use crate::core::config::Config;
use crate::core::lifecycle::Signals;
use crate::error::SyncError;

/// Creates the two halves of the queue for stream `index`.
pub(crate) fn channel(index: usize, capacity: usize) -> (StreamTx, StreamRx) {
    let (tx, rx) = mpsc::channel::<String>(capacity.clamp(1, Config::MAX_CAPACITY));
    (StreamTx { index, tx }, StreamRx { index, rx })
}

/// Producer half of a stream queue.
#[derive(Debug)]
pub(crate) struct StreamTx {
    index: usize,
    tx: mpsc::Sender<String>,
}

impl StreamTx {
    /// Enqueues `item` without waiting.
    pub(crate) fn try_enqueue(&self, item: String) -> Result<(), SyncError> {
        self.tx.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SyncError::CapacityExceeded {
                stream: self.index,
                capacity: self.capacity(),
                len: self.len(),
            },
            mpsc::error::TrySendError::Closed(_) => SyncError::Closed,
        })
    }

    /// Configured capacity of this queue.
    pub(crate) fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Number of messages currently buffered (advisory).
    pub(crate) fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

/// Outcome of a single coordinator pop.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Dequeued {
    /// Next message of the stream.
    Item(String),
    /// Hard stop requested, or every producer handle is gone.
    Closed,
    /// Drain requested and nothing was buffered at the time of the pop.
    Drained,
}

/// Consumer half of a stream queue; owned by the coordinator.
#[derive(Debug)]
pub(crate) struct StreamRx {
    index: usize,
    rx: mpsc::Receiver<String>,
}

impl StreamRx {
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Waits for the next message, a hard stop, or a drain with an empty queue.
    ///
    /// The select is biased: a hard stop wins over buffered data, buffered data
    /// wins over a drain request.
    pub(crate) async fn dequeue(&mut self, signals: &Signals) -> Dequeued {
        tokio::select! {
            biased;
            _ = signals.closed.cancelled() => Dequeued::Closed,
            msg = self.rx.recv() => match msg {
                Some(item) => Dequeued::Item(item),
                None => Dequeued::Closed,
            },
            _ = signals.drain.cancelled() => Dequeued::Drained,
        }
    }

    /// Advisory emptiness check used by the drain heuristic.
    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_enqueue_reports_occupancy_when_full() {
        let (tx, _rx) = channel(1, 2);
        tx.try_enqueue("a".into()).unwrap();
        tx.try_enqueue("b".into()).unwrap();
        assert_eq!(tx.len(), 2);

        let err = tx.try_enqueue("c".into()).unwrap_err();
        assert_eq!(
            err,
            SyncError::CapacityExceeded {
                stream: 1,
                capacity: 2,
                len: 2
            }
        );
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn test_try_enqueue_after_consumer_dropped() {
        let (tx, rx) = channel(0, 4);
        drop(rx);
        assert_eq!(tx.try_enqueue("a".into()), Err(SyncError::Closed));
    }

    #[tokio::test]
    async fn test_dequeue_is_fifo() {
        let signals = Signals::default();
        let (tx, mut rx) = channel(0, 4);
        tx.try_enqueue("first".into()).unwrap();
        tx.try_enqueue("second".into()).unwrap();

        assert_eq!(rx.dequeue(&signals).await, Dequeued::Item("first".into()));
        assert_eq!(rx.dequeue(&signals).await, Dequeued::Item("second".into()));
        assert!(rx.is_empty());
        assert_eq!(tx.len(), 0);
    }

    #[tokio::test]
    async fn test_dequeue_prefers_items_over_drain() {
        let signals = Signals::default();
        let (tx, mut rx) = channel(0, 4);
        tx.try_enqueue("x".into()).unwrap();
        signals.drain.cancel();

        assert_eq!(rx.dequeue(&signals).await, Dequeued::Item("x".into()));
        assert_eq!(rx.dequeue(&signals).await, Dequeued::Drained);
    }

    #[tokio::test]
    async fn test_dequeue_close_discards_buffered() {
        let signals = Signals::default();
        let (tx, mut rx) = channel(0, 4);
        tx.try_enqueue("x".into()).unwrap();
        signals.closed.cancel();

        assert_eq!(rx.dequeue(&signals).await, Dequeued::Closed);
    }

    #[tokio::test]
    async fn test_dequeue_closed_when_producers_gone() {
        let signals = Signals::default();
        let (tx, mut rx) = channel(0, 4);
        drop(tx);
        assert_eq!(rx.dequeue(&signals).await, Dequeued::Closed);
    }
}
