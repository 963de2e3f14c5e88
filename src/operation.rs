/*!
Operation: a single PCB instruction.

An operation pairs a type and descriptor from the meta-data grammar
(`P(run)3`, `I(hard drive)5`, ...) with the work remaining: a cycle count
and the per-cycle cost in milliseconds, resolved from the configuration
at load time. Operations are plain values; queues move and copy them,
nothing shares them.

Boundary operations (`S`/`A` with `start`/`end`) carry zero cycles and
mark the edges of the simulation and of each program.
*/

use std::fmt;

/// Operation type, keyed by the single-letter code in the meta-data
/// grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// `S` — simulator boundary (stream start/end flag).
    SimBoundary,
    /// `A` — application boundary (program start/end flag).
    AppBoundary,
    /// `P` — a processing burst on the simulated CPU.
    Process,
    /// `I` — input from a device.
    Input,
    /// `O` — output to a device.
    Output,
}

impl OpKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'S' => Some(OpKind::SimBoundary),
            'A' => Some(OpKind::AppBoundary),
            'P' => Some(OpKind::Process),
            'I' => Some(OpKind::Input),
            'O' => Some(OpKind::Output),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> char {
        match self {
            OpKind::SimBoundary => 'S',
            OpKind::AppBoundary => 'A',
            OpKind::Process => 'P',
            OpKind::Input => 'I',
            OpKind::Output => 'O',
        }
    }

    /// Boundary operations never carry cycles.
    #[inline]
    pub fn is_boundary(self) -> bool {
        matches!(self, OpKind::SimBoundary | OpKind::AppBoundary)
    }

    /// Input/output operations are handed to an I/O worker.
    #[inline]
    pub fn is_io(self) -> bool {
        matches!(self, OpKind::Input | OpKind::Output)
    }
}

/// Operation descriptor from the meta-data grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Descriptor {
    Start,
    End,
    Run,
    HardDrive,
    Keyboard,
    Monitor,
    Printer,
}

impl Descriptor {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "start" => Some(Descriptor::Start),
            "end" => Some(Descriptor::End),
            "run" => Some(Descriptor::Run),
            "hard drive" => Some(Descriptor::HardDrive),
            "keyboard" => Some(Descriptor::Keyboard),
            "monitor" => Some(Descriptor::Monitor),
            "printer" => Some(Descriptor::Printer),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Descriptor::Start => "start",
            Descriptor::End => "end",
            Descriptor::Run => "run",
            Descriptor::HardDrive => "hard drive",
            Descriptor::Keyboard => "keyboard",
            Descriptor::Monitor => "monitor",
            Descriptor::Printer => "printer",
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single PCB instruction: type, descriptor, remaining cycles, and the
/// per-cycle cost in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub kind: OpKind,
    pub descriptor: Descriptor,
    cycles: u32,
    cycle_time_ms: u64,
}

impl Operation {
    pub fn new(kind: OpKind, descriptor: Descriptor, cycles: u32, cycle_time_ms: u64) -> Self {
        debug_assert!(
            !kind.is_boundary() || cycles == 0,
            "boundary operations carry zero cycles"
        );
        Self {
            kind,
            descriptor,
            cycles,
            cycle_time_ms,
        }
    }

    #[inline]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    #[inline]
    pub fn cycle_time_ms(&self) -> u64 {
        self.cycle_time_ms
    }

    /// Remaining real-time cost of this operation.
    #[inline]
    pub fn remaining_duration_ms(&self) -> u64 {
        u64::from(self.cycles) * self.cycle_time_ms
    }

    #[inline]
    pub fn done(&self) -> bool {
        self.cycles == 0
    }

    /// Consume one cycle of work and return its real-time cost in
    /// milliseconds. Must not be called once `done()`.
    pub fn advance_one_cycle(&mut self) -> u64 {
        debug_assert!(!self.done(), "advance_one_cycle on a finished operation");
        self.cycles -= 1;
        self.cycle_time_ms
    }

    /// Phrase used in I/O worker log lines, e.g. `hard drive input` or
    /// `printer output`. The hard drive is the only bidirectional device,
    /// so its phrase depends on the operation type.
    pub fn io_phrase(&self) -> &'static str {
        match self.descriptor {
            Descriptor::HardDrive => match self.kind {
                OpKind::Input => "hard drive input",
                _ => "hard drive output",
            },
            Descriptor::Keyboard => "keyboard input",
            Descriptor::Monitor => "monitor output",
            Descriptor::Printer => "printer output",
            // The loader rejects non-device descriptors on I/O operations.
            other => other.as_str(),
        }
    }

}

/// Meta-data token form, e.g. `P(run)3`.
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}){}", self.kind.code(), self.descriptor, self.cycles)
    }
}
