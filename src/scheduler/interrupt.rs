/*!
Interrupt queue: pending scheduler events.

Two event kinds flow through it: `IoComplete(pid)` posted by I/O worker
threads when their simulated device latency elapses, and
`QuantumExpired` posted by the scheduler itself when a running process
exhausts its quantum.

The queue is an unbounded MPSC channel: posts never block, the
scheduler drains in post order at the top of each iteration, and the
idle branch waits on the channel with a timeout instead of spinning.
Workers hold a cloned `InterruptSender`; the scheduler keeps the sole
receiver.
*/

use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::program::Pid;

/// A pending scheduler event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// The running process consumed its full quantum.
    QuantumExpired,
    /// Device latency elapsed for the named blocked process.
    IoComplete(Pid),
}

/// Producer handle cloned into each I/O worker.
#[derive(Clone)]
pub struct InterruptSender {
    tx: Sender<Interrupt>,
}

impl InterruptSender {
    /// Post an interrupt. Never blocks; a post after the scheduler has
    /// torn down is dropped.
    pub fn post(&self, interrupt: Interrupt) {
        let _ = self.tx.send(interrupt);
    }
}

/// The scheduler-side queue: single consumer, many producers.
pub struct InterruptQueue {
    tx: Sender<Interrupt>,
    rx: Receiver<Interrupt>,
}

impl InterruptQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Clone a producer handle for an I/O worker.
    pub fn sender(&self) -> InterruptSender {
        InterruptSender {
            tx: self.tx.clone(),
        }
    }

    /// Post from the scheduling thread (quantum expiry).
    pub fn post(&self, interrupt: Interrupt) {
        let _ = self.tx.send(interrupt);
    }

    /// Take the next pending interrupt, if any.
    pub fn try_pop(&self) -> Option<Interrupt> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next interrupt; `None` on timeout.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Interrupt> {
        match self.rx.recv_timeout(timeout) {
            Ok(interrupt) => Some(interrupt),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Cheap probe used between processing cycles to decide whether the
    /// running process should yield.
    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

impl Default for InterruptQueue {
    fn default() -> Self {
        Self::new()
    }
}
