/*!
Per-dispatch operation processing.

`process_program` consumes one operation from the dispatched PCB (two
when the program's `A(start)` announcement is still queued): an I/O
operation is handed to a worker and the PCB parked in the blocked
table; a processing operation runs cycle by cycle on the scheduling
thread, preemptible between cycles under preemptive policies and
bounded by the quantum under RR and SRTF-P.

Quantum accounting is purely virtual: the counter advances with
simulated cycles, and expiry posts a `QuantumExpired` interrupt onto
the same queue that carries I/O completions. The burst observes it on
its next between-cycle probe, so a burst never yields mid-cycle.
*/

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::error::SimError;
use crate::operation::{Descriptor, OpKind, Operation};
use crate::program::{Pid, State};

use super::interrupt::Interrupt;
use super::io_worker;
use super::ready_queue::Slot;
use super::Scheduler;

impl Scheduler {
    /// Run one dispatch of the PCB in `slot`. On return the PCB is
    /// `Blocked` (I/O in flight), `Exit` (queue drained), or still
    /// `Running` (preempted or between operations) for the main loop
    /// to re-queue.
    pub(super) fn process_program(&mut self, slot: Slot) -> Result<(), SimError> {
        let pid = self.registry[slot].id;
        let Some(mut operation) = self.registry[slot].pop_next() else {
            return Err(SimError::EmptyDispatch(pid));
        };

        // A freshly admitted process announces itself and proceeds to
        // its first real operation within the same dispatch.
        if operation.kind == OpKind::AppBoundary && operation.descriptor == Descriptor::Start {
            self.log.emit(&format!("OS: starting process {pid}"));
            match self.registry[slot].pop_next() {
                Some(next) => operation = next,
                None => return Err(SimError::EmptyDispatch(pid)),
            }
        }

        match operation.kind {
            OpKind::Input | OpKind::Output => {
                self.log.emit(&format!("Process {pid}: starting I/O"));
                io_worker::spawn(
                    pid,
                    operation,
                    Arc::clone(&self.log),
                    self.interrupts.sender(),
                );
                self.registry[slot].state = State::Blocked;
                self.blocked.insert(pid, slot);
            }
            OpKind::Process => self.run_processing_burst(slot, pid, operation),
            OpKind::AppBoundary | OpKind::SimBoundary => {
                // Only `A(end)` can reach here (an empty program, or a
                // process returning from its final I/O); the removal
                // check below retires it.
            }
        }

        if self.registry[slot].state != State::Blocked && self.registry[slot].remaining_ops() <= 1 {
            // Only the trailing A(end) remains, if that.
            let _ = self.registry[slot].pop_next();
            self.registry[slot].state = State::Exit;
            self.log.emit(&format!("OS: removing process {pid}"));
        }
        Ok(())
    }

    /// Advance a processing operation cycle by cycle until it finishes
    /// or the process must yield.
    fn run_processing_burst(&mut self, slot: Slot, pid: Pid, mut operation: Operation) {
        self.log.emit(&format!("Process {pid}: processing action"));

        let preemptive = self.policy.preemptive();
        let quantum = self.policy.uses_quantum().then_some(self.quantum_cycles);
        let mut cycles_run: u32 = 0;

        while !operation.done() {
            // Yield between cycles, never mid-cycle: a pending I/O
            // completion or the quantum expiry this burst posted sends
            // the partially advanced operation back to the PCB.
            if preemptive && self.interrupts.is_pending() {
                trace!(pid, cycles_run, "processing burst preempted");
                self.registry[slot].push_front(operation);
                return; // still Running; the main loop re-queues
            }

            let cost = operation.advance_one_cycle();
            thread::sleep(Duration::from_millis(cost));
            cycles_run += 1;

            if quantum == Some(cycles_run) {
                self.interrupts.post(Interrupt::QuantumExpired);
                self.log.emit("Interrupt: quantum expired");
            }
        }

        self.log.emit(&format!("Process {pid}: end processing action"));
    }
}
