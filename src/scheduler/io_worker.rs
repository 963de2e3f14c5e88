/*!
I/O worker: simulated device latency on a detached thread.

The scheduler hands a worker one I/O operation (an immutable snapshot —
the PCB itself has already moved to the blocked table) plus the shared
event log and an interrupt sender. The worker announces the start of the
device access, sleeps for the operation's remaining real-time duration,
announces completion, and posts `IoComplete(pid)` so the scheduler
returns the process to the ready queue.

The worker's two log lines are emitted before the interrupt is posted,
so they are always visible before the scheduler reacts to the
completion. Workers are fire-and-forget; there is no cancellation path
and the run only ends once every blocked process has been returned.
*/

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::logger::EventLog;
use crate::operation::Operation;
use crate::program::Pid;
use crate::scheduler::interrupt::{Interrupt, InterruptSender};

/// Spawn a detached worker simulating one device access for `pid`.
pub fn spawn(pid: Pid, operation: Operation, log: Arc<EventLog>, interrupts: InterruptSender) {
    debug_assert!(operation.kind.is_io(), "I/O worker given a non-I/O operation");
    let duration = Duration::from_millis(operation.remaining_duration_ms());
    let phrase = operation.io_phrase();
    debug!(pid, phrase, ?duration, "spawning I/O worker");

    thread::spawn(move || {
        log.emit(&format!("I/O: process {pid} starting {phrase}"));
        thread::sleep(duration);
        log.emit(&format!("Interrupt: process {pid} done with {phrase}"));
        interrupts.post(Interrupt::IoComplete(pid));
    });
}
