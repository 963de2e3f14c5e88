/*!
Configuration file loader.

Parses the line-based simulator configuration format:

```text
Start Simulator Configuration File
Version/Phase: 3.0
File Path: programs.mdf
CPU Scheduling Code: RR
Quantum Time (cycles): 3
Processor Cycle Time (msec): 10
Monitor Display Time (msec): 20
Hard Drive Cycle Time (msec): 15
Printer Cycle Time (msec): 25
Keyboard Cycle Time (msec): 50
Log: Log to Both
Log File Path: run.log
End Simulator Configuration File.
```

Fields appear in that fixed order. The header and footer lines are
checked literally; each field line is matched by label and its value
parsed into the typed `Config`. A version within one minor release of
the expected one only warns (the reference test configs ship a 2.0
version against a 3.0 simulator); anything further out is an error.
*/

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;
use crate::operation::{Descriptor, OpKind};

/// Version this simulator expects in `Version/Phase`.
pub const EXPECTED_VERSION: f32 = 3.0;

// Mismatches within one minor release warn instead of failing.
const VERSION_TOLERANCE: f32 = 1.0;

const HEADER: &str = "Start Simulator Configuration File";
const FOOTER: &str = "End Simulator Configuration File";

/// CPU scheduling policy, keyed by the `CPU Scheduling Code` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    Fifo,
    FifoP,
    Sjf,
    SrtfN,
    SrtfP,
    Rr,
}

impl Policy {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FIFO" => Some(Policy::Fifo),
            "FIFO-P" => Some(Policy::FifoP),
            "SJF" => Some(Policy::Sjf),
            "SRTF-N" => Some(Policy::SrtfN),
            "SRTF-P" => Some(Policy::SrtfP),
            "RR" => Some(Policy::Rr),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::FifoP => "FIFO-P",
            Policy::Sjf => "SJF",
            Policy::SrtfN => "SRTF-N",
            Policy::SrtfP => "SRTF-P",
            Policy::Rr => "RR",
        }
    }

    /// Preemptive policies probe for pending interrupts between cycles
    /// of a processing burst.
    #[inline]
    pub fn preemptive(self) -> bool {
        matches!(self, Policy::FifoP | Policy::SrtfP | Policy::Rr)
    }

    /// Policies that count cycles against the quantum. FIFO-P is
    /// preemptive but its quantum is conceptually infinite.
    #[inline]
    pub fn uses_quantum(self) -> bool {
        matches!(self, Policy::SrtfP | Policy::Rr)
    }

    /// Shortest-remaining policies assign pids at first dispatch so ids
    /// reflect start order. SJF behaves as SRTF-N.
    #[inline]
    pub fn lazy_ids(self) -> bool {
        matches!(self, Policy::Sjf | Policy::SrtfN | Policy::SrtfP)
    }
}

/// Where `EventLog` lines go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSink {
    Screen,
    File,
    Both,
}

impl LogSink {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Log to Monitor" => Some(LogSink::Screen),
            "Log to File" => Some(LogSink::File),
            "Log to Both" => Some(LogSink::Both),
            _ => None,
        }
    }
}

/// Typed simulator configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub version: f32,
    pub meta_data_path: PathBuf,
    pub policy: Policy,
    pub quantum_cycles: u32,
    pub processor_cycle_ms: u64,
    pub monitor_cycle_ms: u64,
    pub hard_drive_cycle_ms: u64,
    pub printer_cycle_ms: u64,
    pub keyboard_cycle_ms: u64,
    pub log_sink: LogSink,
    pub log_path: PathBuf,
}

impl Config {
    /// Load and parse a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse configuration text. See the module docs for the format.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = Fields::new(text);

        if lines.next_line() != Some(HEADER) {
            return Err(ConfigError::MalformedHeader);
        }

        let version = lines.value("Version/Phase")?;
        let version: f32 = version
            .parse()
            .map_err(|_| bad_value("Version/Phase", version))?;
        if version != EXPECTED_VERSION {
            if (version - EXPECTED_VERSION).abs() <= VERSION_TOLERANCE {
                warn!("config version mismatch: expected {EXPECTED_VERSION}, given {version}");
            } else {
                return Err(ConfigError::VersionMismatch {
                    expected: EXPECTED_VERSION,
                    given: version,
                });
            }
        }

        let meta_data_path = PathBuf::from(lines.value("File Path")?);

        let code = lines.value("CPU Scheduling Code")?;
        let policy = Policy::from_code(code)
            .ok_or_else(|| ConfigError::UnknownSchedulingCode(code.to_string()))?;

        let quantum_cycles = lines.int("Quantum Time (cycles)")?;
        if policy.uses_quantum() && quantum_cycles < 1 {
            return Err(bad_value("Quantum Time (cycles)", &quantum_cycles.to_string()));
        }

        let processor_cycle_ms = lines.int("Processor Cycle Time (msec)")?;
        let monitor_cycle_ms = lines.int("Monitor Display Time (msec)")?;
        let hard_drive_cycle_ms = lines.int("Hard Drive Cycle Time (msec)")?;
        let printer_cycle_ms = lines.int("Printer Cycle Time (msec)")?;
        let keyboard_cycle_ms = lines.int("Keyboard Cycle Time (msec)")?;

        let sink_label = lines.value("Log")?;
        let log_sink = LogSink::from_label(sink_label)
            .ok_or_else(|| ConfigError::UnknownLogSink(sink_label.to_string()))?;

        let log_path = PathBuf::from(lines.value("Log File Path")?);

        match lines.next_line() {
            Some(line) if line.starts_with(FOOTER) => {}
            _ => return Err(ConfigError::MalformedFooter),
        }

        Ok(Config {
            version,
            meta_data_path,
            policy,
            quantum_cycles: quantum_cycles as u32,
            processor_cycle_ms: processor_cycle_ms as u64,
            monitor_cycle_ms: monitor_cycle_ms as u64,
            hard_drive_cycle_ms: hard_drive_cycle_ms as u64,
            printer_cycle_ms: printer_cycle_ms as u64,
            keyboard_cycle_ms: keyboard_cycle_ms as u64,
            log_sink,
            log_path,
        })
    }

    /// Cycle time an operation resolves to at load time, by type and
    /// descriptor. Boundary operations cost nothing.
    pub fn cycle_time_for(&self, kind: OpKind, descriptor: Descriptor) -> u64 {
        match kind {
            OpKind::Process => self.processor_cycle_ms,
            OpKind::Input | OpKind::Output => match descriptor {
                Descriptor::HardDrive => self.hard_drive_cycle_ms,
                Descriptor::Keyboard => self.keyboard_cycle_ms,
                Descriptor::Monitor => self.monitor_cycle_ms,
                Descriptor::Printer => self.printer_cycle_ms,
                _ => 0,
            },
            OpKind::SimBoundary | OpKind::AppBoundary => 0,
        }
    }
}

fn bad_value(field: &'static str, value: &str) -> ConfigError {
    ConfigError::BadValue {
        field,
        value: value.to_string(),
    }
}

/// Cursor over the non-empty lines of the file, matching labelled
/// `Label: value` fields in declaration order.
struct Fields<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str) -> Self {
        Self { lines: text.lines() }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        self.lines.by_ref().map(str::trim).find(|line| !line.is_empty())
    }

    /// Next field's value, verifying its label.
    fn value(&mut self, label: &'static str) -> Result<&'a str, ConfigError> {
        let line = self.next_line().ok_or(ConfigError::MissingField(label))?;
        let (found, value) = line
            .split_once(':')
            .ok_or(ConfigError::MissingField(label))?;
        if found.trim() != label {
            return Err(ConfigError::MissingField(label));
        }
        Ok(value.trim())
    }

    fn int(&mut self, label: &'static str) -> Result<i64, ConfigError> {
        let value = self.value(label)?;
        let parsed: i64 = value.parse().map_err(|_| bad_value(label, value))?;
        if parsed < 0 {
            return Err(bad_value(label, value));
        }
        Ok(parsed)
    }
}
