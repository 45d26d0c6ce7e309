pub mod events;

use self::events::Attempt;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Attempts submitted from outside the engine's turn, drained on the next
/// loop activation after auto-expiry.
pub struct AttemptQueue {
    sender: Sender<Attempt>,
    receiver: Receiver<Attempt>,
}

impl AttemptQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Can be called from any thread holding a sender.
    pub fn push(&self, attempt: Attempt) {
        let _ = self.sender.send(attempt);
    }

    /// Non-blocking. Returns None if the queue is empty.
    pub fn pop(&self) -> Option<Attempt> {
        self.receiver.try_recv().ok()
    }

    /// Drops everything queued so far. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }

    pub fn sender(&self) -> Sender<Attempt> {
        self.sender.clone()
    }
}

impl Default for AttemptQueue {
    fn default() -> Self {
        Self::new()
    }
}
