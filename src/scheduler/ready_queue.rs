/*!
Ready queue: the policy-parameterised structure of runnable processes.

One contract (`push`, `pop`, `is_empty`) over two realisations:

- a FIFO list for FIFO and RR, which schedule in insertion order;
- a priority heap for the remaining policies, keyed either by pid
  (FIFO-P: arrival order with preemption) or by the PCB's remaining
  burst (SJF / SRTF-N / SRTF-P: shortest remaining first).

The queue holds registry slots, never PCB copies; the scheduler is the
single owner of every PCB. Keys are snapshotted at push time — a PCB's
burst only changes while it is running or blocked, never while queued,
so a snapshot cannot go stale. Ties break by pid ascending (0 meaning
"just created"), then by slot for full determinism.
*/

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::config::Policy;
use crate::program::Program;

/// Index into the scheduler's program registry.
pub type Slot = usize;

// Priority key variants for the heap realisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PriorityKey {
    // Order by pid: arrival order, preemptible (FIFO-P).
    Arrival,
    // Order by remaining burst, recomputed on every push (SJF, SRTF).
    ShortestRemaining,
}

// Lexicographic ordering: primary key, then pid, then slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    primary: u64,
    id: u32,
    slot: Slot,
}

enum Structure {
    Fifo(VecDeque<Slot>),
    Priority {
        key: PriorityKey,
        heap: BinaryHeap<Reverse<Entry>>,
    },
}

/// Policy-parameterised ready structure over PCB slots.
pub struct ReadyQueue {
    structure: Structure,
}

impl ReadyQueue {
    /// Pick the realisation for a scheduling policy.
    pub fn for_policy(policy: Policy) -> Self {
        let structure = match policy {
            Policy::Fifo | Policy::Rr => Structure::Fifo(VecDeque::new()),
            Policy::FifoP => Structure::Priority {
                key: PriorityKey::Arrival,
                heap: BinaryHeap::new(),
            },
            Policy::Sjf | Policy::SrtfN | Policy::SrtfP => Structure::Priority {
                key: PriorityKey::ShortestRemaining,
                heap: BinaryHeap::new(),
            },
        };
        Self { structure }
    }

    /// Admit a runnable PCB, snapshotting its ordering key.
    pub fn push(&mut self, slot: Slot, program: &Program) {
        match &mut self.structure {
            Structure::Fifo(list) => list.push_back(slot),
            Structure::Priority { key, heap } => {
                let primary = match key {
                    PriorityKey::Arrival => u64::from(program.id),
                    PriorityKey::ShortestRemaining => program.remaining_burst_ms(),
                };
                heap.push(Reverse(Entry {
                    primary,
                    id: program.id,
                    slot,
                }));
            }
        }
    }

    /// Remove and return the preferred slot.
    pub fn pop(&mut self) -> Option<Slot> {
        match &mut self.structure {
            Structure::Fifo(list) => list.pop_front(),
            Structure::Priority { heap, .. } => heap.pop().map(|Reverse(entry)| entry.slot),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        match &self.structure {
            Structure::Fifo(list) => list.is_empty(),
            Structure::Priority { heap, .. } => heap.is_empty(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.structure {
            Structure::Fifo(list) => list.len(),
            Structure::Priority { heap, .. } => heap.len(),
        }
    }
}
