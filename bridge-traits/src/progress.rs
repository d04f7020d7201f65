//! Transfer Progress Channel
//!
//! Uploads report byte-level progress through an unbounded channel instead of
//! a callback. The sender side travels with the transfer; the receiver side is
//! drained by whoever owns the persisted progress value.

use tokio::sync::mpsc;

/// A single progress observation for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes handed to the transport so far
    pub bytes_sent: u64,
    /// Total bytes the transfer will send
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(bytes_sent: u64, total_bytes: u64) -> Self {
        Self {
            bytes_sent,
            total_bytes,
        }
    }

    /// Completion as a percentage in `[0, 100]`.
    ///
    /// An empty transfer counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        let ratio = self.bytes_sent as f64 / self.total_bytes as f64;
        (ratio * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_sent >= self.total_bytes
    }
}

/// Sending half of a progress channel.
///
/// Reporting never fails: once the receiver is gone, observations are dropped.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    sender: mpsc::UnboundedSender<TransferProgress>,
}

impl ProgressSender {
    /// Report that `bytes_sent` of `total_bytes` have been transferred.
    pub fn report(&self, bytes_sent: u64, total_bytes: u64) {
        let _ = self
            .sender
            .send(TransferProgress::new(bytes_sent, total_bytes));
    }

    /// Whether anyone is still listening.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Receiving half of a progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<TransferProgress>;

/// Create a connected progress sender/receiver pair.
///
/// The receiver yields `None` once every sender clone has been dropped, which
/// happens when the transfer future holding it completes.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ProgressSender { sender }, receiver)
}
