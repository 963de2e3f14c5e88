/*!
Blocked table: processes awaiting I/O, keyed by pid.

A PCB enters the table when the scheduler hands its I/O operation to a
worker, and leaves on the matching `IoComplete(pid)` interrupt. The
table holds registry slots like the ready queue; membership coincides
exactly with the `Blocked` state, and a pid is never in the ready queue
and the blocked table at the same time.
*/

use std::collections::HashMap;

use crate::program::Pid;
use crate::scheduler::ready_queue::Slot;

/// pid -> registry slot for processes awaiting I/O completion.
#[derive(Debug, Default)]
pub struct BlockedTable {
    by_pid: HashMap<Pid, Slot>,
}

impl BlockedTable {
    pub fn new() -> Self {
        Self {
            by_pid: HashMap::new(),
        }
    }

    /// Record a process as blocked. A pid blocks at most once at a time.
    pub fn insert(&mut self, pid: Pid, slot: Slot) {
        let previous = self.by_pid.insert(pid, slot);
        debug_assert!(previous.is_none(), "pid {pid} was already blocked");
    }

    /// Remove and return the slot for a completed I/O, or `None` for an
    /// unknown pid (the caller treats that as a fatal invariant
    /// violation).
    pub fn take(&mut self, pid: Pid) -> Option<Slot> {
        self.by_pid.remove(&pid)
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.by_pid.contains_key(&pid)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_pid.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_pid.len()
    }
}
