/*!
Scheduler module: the process-lifecycle engine and its submodules.

Modules and responsibilities
- `Scheduler`: master loop implemented in this module — drains
  interrupts, picks the next PCB, dispatches it, manages state
  transitions and pid assignment.
- `dispatch`: per-operation processing (`process_program`) — boundary
  handling, I/O hand-off, preemptible processing bursts, quantum
  accounting.
- `interrupt`: pending-event queue (I/O completion, quantum expiry) as
  an MPSC channel with a timed receive for the idle tick.
- `ready_queue`: policy-parameterised structure of runnable PCBs.
- `blocked`: pid-keyed table of PCBs awaiting I/O.
- `io_worker`: detached device-latency threads.

Ownership
- The scheduler's registry owns every PCB for the whole run. The ready
  queue and blocked table hold registry slots; a non-exited PCB is in
  exactly one of {ready queue, blocked table, current dispatch} at any
  instant, and the registry keeps the id-keyed back reference for
  post-mortem queries.
*/

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::{Config, Policy};
use crate::error::SimError;
use crate::logger::EventLog;
use crate::program::{Pid, Program, State};

pub mod blocked;
mod dispatch;
pub mod interrupt;
pub mod io_worker;
pub mod ready_queue;


pub use blocked::BlockedTable;
pub use interrupt::{Interrupt, InterruptQueue, InterruptSender};
pub use ready_queue::{ReadyQueue, Slot};

// How long the idle branch waits on the interrupt channel before
// emitting another idle line.
const IDLE_TICK: Duration = Duration::from_millis(20);

/// The scheduling engine: owns every PCB and runs the simulation to
/// completion on the calling thread.
pub struct Scheduler {
    // Owns all PCBs; queues refer to them by slot.
    registry: Vec<Program>,
    // id-keyed back reference, filled as pids are assigned.
    pid_to_slot: HashMap<Pid, Slot>,

    ready: ReadyQueue,
    blocked: BlockedTable,
    interrupts: InterruptQueue,

    next_pid: Pid,
    policy: Policy,
    quantum_cycles: u32,

    log: Arc<EventLog>,
}

impl Scheduler {
    pub fn new(programs: Vec<Program>, config: &Config, log: Arc<EventLog>) -> Self {
        debug!(
            policy = config.policy.code(),
            quantum = config.quantum_cycles,
            programs = programs.len(),
            "scheduler ready"
        );
        Self {
            ready: ReadyQueue::for_policy(config.policy),
            blocked: BlockedTable::new(),
            interrupts: InterruptQueue::new(),
            registry: programs,
            pid_to_slot: HashMap::new(),
            next_pid: 1,
            policy: config.policy,
            quantum_cycles: config.quantum_cycles,
            log,
        }
    }

    /// Run the whole batch to completion.
    pub fn run(&mut self) -> Result<(), SimError> {
        self.log.restart_clock();
        self.log.emit("Simulator program starting");
        self.log.emit("OS: preparing all processes");
        self.admit_all();

        while !self.ready.is_empty() || !self.blocked.is_empty() {
            self.drain_interrupts()?;
            if !self.ready.is_empty() {
                self.dispatch()?;
            } else if !self.blocked.is_empty() {
                self.idle()?;
            }
        }

        self.log.emit("Simulator program ending");
        Ok(())
    }

    /// Post-mortem lookup of a PCB by its pid.
    pub fn program(&self, pid: Pid) -> Option<&Program> {
        let slot = *self.pid_to_slot.get(&pid)?;
        self.registry.get(slot)
    }

    /// Move every loaded PCB into the ready queue. Policies that
    /// schedule by arrival assign pids here; shortest-remaining
    /// policies wait until first dispatch so ids reflect start order.
    fn admit_all(&mut self) {
        for slot in 0..self.registry.len() {
            if !self.policy.lazy_ids() {
                let pid = self.next_pid;
                self.next_pid += 1;
                self.registry[slot].assign_id(pid);
                self.pid_to_slot.insert(pid, slot);
            }
            self.push_ready(slot);
        }
    }

    /// Drain every pending interrupt, in post order, before the next
    /// dispatch decision.
    fn drain_interrupts(&mut self) -> Result<(), SimError> {
        while let Some(interrupt) = self.interrupts.try_pop() {
            self.handle_interrupt(interrupt)?;
        }
        Ok(())
    }

    fn handle_interrupt(&mut self, interrupt: Interrupt) -> Result<(), SimError> {
        match interrupt {
            Interrupt::IoComplete(pid) => {
                let slot = self.blocked.take(pid).ok_or(SimError::UnknownPid(pid))?;
                trace!(pid, "I/O complete, process ready");
                self.push_ready(slot);
            }
            Interrupt::QuantumExpired => {
                // The dispatch that posted it already yielded; nothing
                // to transition here.
                trace!("quantum expiry drained");
            }
        }
        Ok(())
    }

    /// Select and run the preferred ready PCB for one dispatch.
    fn dispatch(&mut self) -> Result<(), SimError> {
        self.log.emit("OS: selecting next process");
        let Some(slot) = self.ready.pop() else {
            return Ok(());
        };

        let program = &mut self.registry[slot];
        if !program.has_started() {
            if program.id == 0 {
                let pid = self.next_pid;
                self.next_pid += 1;
                program.assign_id(pid);
                self.pid_to_slot.insert(pid, slot);
                debug!(pid, slot, "pid assigned at first dispatch");
            }
            program.mark_started();
        }
        program.state = State::Running;
        trace!(
            pid = self.registry[slot].id,
            burst_ms = self.registry[slot].remaining_burst_ms(),
            "dispatching"
        );

        self.process_program(slot)?;

        // Unfinished and unblocked: back into the ready queue.
        if self.registry[slot].state == State::Running {
            self.push_ready(slot);
        }
        Ok(())
    }

    /// Nothing runnable but I/O is outstanding: announce the idle wait
    /// and sleep on the interrupt channel for up to one tick.
    fn idle(&mut self) -> Result<(), SimError> {
        self.log.emit("OS Idle: Waiting for I/O to finish");
        if let Some(interrupt) = self.interrupts.pop_timeout(IDLE_TICK) {
            self.handle_interrupt(interrupt)?;
        }
        Ok(())
    }

    fn push_ready(&mut self, slot: Slot) {
        self.registry[slot].state = State::Ready;
        self.ready.push(slot, &self.registry[slot]);
    }
}
