//! Result channel between the producer and the collector
//!
//! Toyota Way: Heijunka (Load Balancing)
//! - Bounded queue sized to the batch length prevents unbounded buffering
//! - Many worker threads push concurrently, exactly one collector pops
//!
//! ## Termination protocol
//!
//! Items are [`Delivery::Result`] values followed by exactly one
//! [`Delivery::Done`]. The sentinel can only be sent by
//! [`ResultSender::finish`], which consumes the only sender, so it is
//! sent at most once and nothing can follow it. Dropping the sender
//! without finishing closes the channel instead, which the collector
//! reports as [`Error::ResultChannelClosed`].

use crate::{Error, Result};
use tokio::sync::mpsc;

/// One item on the result channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<R> {
    /// A completed trial result
    Result(R),
    /// No more results will follow
    Done,
}

/// Bounded result channel for one batch.
pub struct ResultChannel<R> {
    sender: ResultSender<R>,
    receiver: ResultReceiver<R>,
}

impl<R: Send> ResultChannel<R> {
    /// Create a channel for a batch of `batch_len` trials.
    ///
    /// Capacity is `batch_len`, raised to 1 for an empty batch so the
    /// sentinel always fits.
    #[must_use]
    pub fn for_batch(batch_len: usize) -> Self {
        let (sender, receiver) = mpsc::channel(batch_len.max(1));
        Self {
            sender: ResultSender { inner: sender },
            receiver: ResultReceiver { inner: receiver },
        }
    }

    /// Split into the producer and collector halves.
    #[must_use]
    pub fn split(self) -> (ResultSender<R>, ResultReceiver<R>) {
        (self.sender, self.receiver)
    }
}

/// Producer half. Shared by reference across worker threads.
pub struct ResultSender<R> {
    inner: mpsc::Sender<Delivery<R>>,
}

impl<R: Send> ResultSender<R> {
    /// Push one result, blocking the calling thread while the channel is full.
    ///
    /// Must be called from a worker thread, not from inside an async task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResultChannelClosed`] if the collector is gone.
    pub fn push(&self, result: R) -> Result<()> {
        self.inner
            .blocking_send(Delivery::Result(result))
            .map_err(|_| Error::ResultChannelClosed)
    }

    /// Push the sentinel and close the producer side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResultChannelClosed`] if the collector is gone.
    pub fn finish(self) -> Result<()> {
        self.inner
            .blocking_send(Delivery::Done)
            .map_err(|_| Error::ResultChannelClosed)
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.max_capacity()
    }
}

/// Collector half.
pub struct ResultReceiver<R> {
    inner: mpsc::Receiver<Delivery<R>>,
}

impl<R: Send> ResultReceiver<R> {
    /// Wait for the next delivery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResultChannelClosed`] if the producer went away
    /// without sending the sentinel.
    pub async fn next(&mut self) -> Result<Delivery<R>> {
        self.inner.recv().await.ok_or(Error::ResultChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_results_then_sentinel() {
        let (sender, mut receiver) = ResultChannel::for_batch(3).split();

        let producer = tokio::task::spawn_blocking(move || {
            for i in 0..3 {
                sender.push(i).unwrap();
            }
            sender.finish().unwrap();
        });

        for i in 0..3 {
            assert_eq!(receiver.next().await.unwrap(), Delivery::Result(i));
        }
        assert_eq!(receiver.next().await.unwrap(), Delivery::Done);
        producer.await.unwrap();
        // Sender consumed by finish: channel is closed afterwards
        assert!(matches!(
            receiver.next().await,
            Err(Error::ResultChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_channel_holds_sentinel() {
        let (sender, mut receiver) = ResultChannel::<u8>::for_batch(0).split();
        assert_eq!(sender.capacity(), 1);

        tokio::task::spawn_blocking(move || sender.finish())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(receiver.next().await.unwrap(), Delivery::Done);
    }

    #[tokio::test]
    async fn test_dropped_sender_closes_channel() {
        let (sender, mut receiver) = ResultChannel::<u8>::for_batch(4).split();
        drop(sender);

        assert!(matches!(
            receiver.next().await,
            Err(Error::ResultChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped() {
        let (sender, receiver) = ResultChannel::for_batch(2).split();
        drop(receiver);

        let result = tokio::task::spawn_blocking(move || sender.push(1)).await.unwrap();
        assert!(matches!(result, Err(Error::ResultChannelClosed)));
    }

    #[tokio::test]
    async fn test_channel_bounded() {
        use tokio::time::{timeout, Duration};

        let (sender, mut receiver) = ResultChannel::for_batch(2).split();

        // Fill the channel, then a third push must block until a slot frees
        let producer = tokio::task::spawn_blocking(move || {
            sender.push(1).unwrap();
            sender.push(2).unwrap();
            sender.push(3).unwrap();
            sender.finish().unwrap();
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished(), "Channel should be full and block");

        let mut seen = Vec::new();
        loop {
            match timeout(Duration::from_secs(5), receiver.next()).await.unwrap().unwrap() {
                Delivery::Result(r) => seen.push(r),
                Delivery::Done => break,
            }
        }
        producer.await.unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
