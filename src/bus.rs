use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{trace, warn};

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes `msg` and returns how many subscribers received it. Messages
    /// published with no subscribers are dropped.
    pub fn publish(&self, msg: T) -> usize {
        match self.tx.send(Arc::new(msg)) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("Published with no subscribers; message dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Inbox<T> {
        Inbox {
            rx: self.tx.subscribe(),
        }
    }
}

/// Non-blocking subscriber end of a [`Topic`], drained once per frame.
#[derive(Debug)]
pub struct Inbox<T> {
    rx: broadcast::Receiver<Arc<T>>,
}

impl<T> Inbox<T> {
    /// Takes every message currently queued, oldest first.
    ///
    /// If the inbox fell behind, the overwritten messages are lost and
    /// draining continues from the oldest one still held. Returns an empty
    /// batch once the topic is closed.
    pub fn drain(&mut self) -> Vec<Arc<T>> {
        let mut batch = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => batch.push(msg),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Inbox lagged; oldest messages dropped.");
                }
            }
        }
        batch
    }
}
