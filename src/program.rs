/*!
Program: the process control block (PCB).

A program is an ordered queue of remaining operations plus the scheduling
metadata the engine needs: an id (0 until the process is first
dispatched), a lifecycle state, and `remaining_burst_ms`, the running sum
of every queued operation's remaining duration. The accumulator is
maintained on every queue mutation so shortest-remaining policies can
order PCBs without walking their queues.

Lifecycle: the loader creates programs in `Start`; the scheduler admits
them to `Ready`; a dispatched program oscillates `Ready -> Running ->
(Ready | Blocked | Exit)`. `Exit` is terminal and coincides with an empty
queue.
*/

use std::collections::VecDeque;

use crate::operation::Operation;

/// Process identifier. 0 means "not yet assigned"; real pids start at 1.
pub type Pid = u32;

/// PCB lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Start,
    Ready,
    Running,
    Blocked,
    Exit,
}

/// A loaded program and its scheduling metadata.
#[derive(Clone, Debug)]
pub struct Program {
    /// 0 until first dispatch; ids reflect start order under
    /// shortest-remaining policies, admission order otherwise.
    pub id: Pid,
    pub state: State,

    // Set at first dispatch; kept separate from the id-0 sentinel so the
    // two concerns (display id vs. dispatch history) stay independent.
    started: bool,

    // Remaining operations, head = next to run.
    operations: VecDeque<Operation>,

    // Invariant: equals the sum of remaining_duration_ms over the queue.
    remaining_burst_ms: u64,
}

impl Program {
    pub fn new() -> Self {
        Self {
            id: 0,
            state: State::Start,
            started: false,
            operations: VecDeque::new(),
            remaining_burst_ms: 0,
        }
    }

    /// Append an operation at load time.
    pub fn enqueue(&mut self, operation: Operation) {
        self.remaining_burst_ms += operation.remaining_duration_ms();
        self.operations.push_back(operation);
    }

    /// Remove and return the next operation, deducting its remaining
    /// duration from the burst accumulator. `None` when the queue is
    /// empty.
    pub fn pop_next(&mut self) -> Option<Operation> {
        let operation = self.operations.pop_front()?;
        self.remaining_burst_ms -= operation.remaining_duration_ms();
        Some(operation)
    }

    /// Return a partially consumed operation to the head of the queue
    /// after a quantum or interrupt yield, restoring the accumulator.
    pub fn push_front(&mut self, operation: Operation) {
        self.remaining_burst_ms += operation.remaining_duration_ms();
        self.operations.push_front(operation);
    }

    #[inline]
    pub fn front(&self) -> Option<&Operation> {
        self.operations.front()
    }

    #[inline]
    pub fn remaining_ops(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn remaining_burst_ms(&self) -> u64 {
        self.remaining_burst_ms
    }

    /// True once the queue has fully drained.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.operations.is_empty()
    }

    /// Assign the pid on first dispatch. Must not already carry one.
    pub fn assign_id(&mut self, pid: Pid) {
        debug_assert_eq!(self.id, 0, "pid reassigned");
        debug_assert!(pid != 0, "real pids start at 1");
        self.id = pid;
    }

    #[inline]
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Record the first dispatch.
    pub fn mark_started(&mut self) {
        self.started = true;
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Descriptor, OpKind, Operation};

    fn boundary(descriptor: Descriptor) -> Operation {
        Operation::new(OpKind::AppBoundary, descriptor, 0, 0)
    }

    fn processing(cycles: u32, cycle_time_ms: u64) -> Operation {
        Operation::new(OpKind::Process, Descriptor::Run, cycles, cycle_time_ms)
    }

    fn sum_of_queue(program: &Program) -> u64 {
        let mut probe = program.clone();
        let mut total = 0;
        while let Some(op) = probe.pop_next() {
            total += op.remaining_duration_ms();
        }
        total
    }

    #[test]
    fn burst_accumulator_tracks_enqueue_and_pop() {
        let mut program = Program::new();
        program.enqueue(boundary(Descriptor::Start));
        program.enqueue(processing(3, 10));
        program.enqueue(Operation::new(OpKind::Input, Descriptor::Keyboard, 2, 5));
        program.enqueue(boundary(Descriptor::End));

        assert_eq!(program.remaining_ops(), 4);
        assert_eq!(program.remaining_burst_ms(), 40);
        assert_eq!(program.remaining_burst_ms(), sum_of_queue(&program));

        let start = program.pop_next().unwrap();
        assert_eq!(start.descriptor, Descriptor::Start);
        assert_eq!(program.remaining_burst_ms(), 40);

        let run = program.pop_next().unwrap();
        assert_eq!(run.remaining_duration_ms(), 30);
        assert_eq!(program.remaining_burst_ms(), 10);
        assert_eq!(program.remaining_burst_ms(), sum_of_queue(&program));
    }

    #[test]
    fn push_front_restores_a_partial_operation() {
        let mut program = Program::new();
        program.enqueue(processing(4, 10));
        program.enqueue(boundary(Descriptor::End));
        assert_eq!(program.remaining_burst_ms(), 40);

        let mut op = program.pop_next().unwrap();
        assert_eq!(program.remaining_burst_ms(), 0);

        // Two cycles advanced under a quantum, then preempted.
        op.advance_one_cycle();
        op.advance_one_cycle();
        program.push_front(op);

        assert_eq!(program.remaining_burst_ms(), 20);
        assert_eq!(program.front().unwrap().cycles(), 2);
        assert_eq!(program.remaining_burst_ms(), sum_of_queue(&program));
    }

    #[test]
    fn pop_on_empty_queue_returns_none() {
        let mut program = Program::new();
        assert!(program.pop_next().is_none());
        assert!(program.is_done());
        assert_eq!(program.remaining_burst_ms(), 0);
    }

    #[test]
    fn id_assignment_happens_once() {
        let mut program = Program::new();
        assert_eq!(program.id, 0);
        assert!(!program.has_started());

        program.assign_id(1);
        program.mark_started();
        assert_eq!(program.id, 1);
        assert!(program.has_started());
    }

    #[test]
    fn fresh_program_is_in_start_state() {
        let program = Program::new();
        assert_eq!(program.state, State::Start);
        assert_eq!(program.id, 0);
    }
}
