//! Blocking consumer for listener notifications
//!
//! A listening session pushes each change-of-value notification as a
//! [`RecordBatch`] of one container. The host side drains them through a
//! [`RecordReceiver`] without needing async/await.

use std::sync::mpsc;
use std::time::Duration;

use crate::channel::RecordBatch;

/// Sending half handed to `start_listening`.
#[derive(Debug, Clone)]
pub struct RecordListener {
    tx: mpsc::Sender<RecordBatch>,
}

impl RecordListener {
    /// Delivers a batch. Returns `false` once the receiver is gone.
    pub fn deliver(&self, batch: RecordBatch) -> bool {
        self.tx.send(batch).is_ok()
    }
}

/// Creates a connected listener/receiver pair.
pub fn records_channel() -> (RecordListener, RecordReceiver) {
    let (tx, rx) = mpsc::channel();
    (RecordListener { tx }, RecordReceiver { rx })
}

/// Blocking iterator over delivered record batches
///
/// Blocks on `next()` until a batch is available or every listener has
/// been dropped. Use `try_recv()` for non-blocking access.
pub struct RecordReceiver {
    rx: mpsc::Receiver<RecordBatch>,
}

impl RecordReceiver {
    /// Block until a batch is available
    ///
    /// Returns `None` if all listeners are dropped.
    pub fn recv(&self) -> Option<RecordBatch> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<RecordBatch> {
        self.rx.try_recv().ok()
    }

    /// Block until a batch is available or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RecordBatch> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking iterator over currently queued batches
    pub fn try_iter(&self) -> TryIterator<'_> {
        TryIterator { inner: self }
    }

    /// Blocks for up to `timeout` on each call to `next()`.
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIterator<'_> {
        TimeoutIterator { inner: self, timeout }
    }
}

impl Iterator for RecordReceiver {
    type Item = RecordBatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

pub struct TryIterator<'a> {
    inner: &'a RecordReceiver,
}

impl<'a> Iterator for TryIterator<'a> {
    type Item = RecordBatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

pub struct TimeoutIterator<'a> {
    inner: &'a RecordReceiver,
    timeout: Duration,
}

impl<'a> Iterator for TimeoutIterator<'a> {
    type Item = RecordBatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRecordContainer;

    #[test]
    fn test_try_recv_empty() {
        let (_listener, receiver) = records_channel();
        assert!(receiver.try_recv().is_none());
        assert_eq!(receiver.try_iter().count(), 0);
    }

    #[test]
    fn test_recv_timeout_empty() {
        let (_listener, receiver) = records_channel();

        let start = std::time::Instant::now();
        assert!(receiver.recv_timeout(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_deliver_and_drain() {
        let (listener, receiver) = records_channel();
        assert!(listener.deliver(vec![ChannelRecordContainer::new("a", "A")]));
        assert!(listener.deliver(vec![ChannelRecordContainer::new("b", "B")]));

        let ids: Vec<_> = receiver.try_iter().map(|batch| batch[0].channel_id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_deliver_after_receiver_dropped() {
        let (listener, receiver) = records_channel();
        drop(receiver);
        assert!(!listener.deliver(Vec::new()));
    }

    #[test]
    fn test_iterator_ends_when_listeners_dropped() {
        let (listener, receiver) = records_channel();
        listener.deliver(Vec::new());
        drop(listener);
        assert_eq!(receiver.count(), 1);
    }
}
