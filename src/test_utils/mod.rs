//! Shared test utilities for building configuration and meta-data
//! inputs.
//!
//! These helpers de-duplicate fixture text across the config, meta-data,
//! and scheduler test suites. They intentionally support just what the
//! tests need: a well-formed config file with pluggable policy and log
//! fields, a meta-data stream assembled from program bodies, and a
//! ready-made `Config` value for in-memory runs.

#![allow(dead_code)]

use std::path::PathBuf;

use crate::config::{Config, LogSink, Policy};
use crate::metadata;

/// Render a complete configuration file.
///
/// Cycle times are fixed (processor 10, monitor 20, hard drive 15,
/// printer 25, keyboard 50) so tests can assert resolved values.
pub fn config_text(
    policy: &str,
    quantum: u32,
    meta_path: &str,
    log_label: &str,
    log_path: &str,
) -> String {
    format!(
        "Start Simulator Configuration File\n\
         Version/Phase: 3.0\n\
         File Path: {meta_path}\n\
         CPU Scheduling Code: {policy}\n\
         Quantum Time (cycles): {quantum}\n\
         Processor Cycle Time (msec): 10\n\
         Monitor Display Time (msec): 20\n\
         Hard Drive Cycle Time (msec): 15\n\
         Printer Cycle Time (msec): 25\n\
         Keyboard Cycle Time (msec): 50\n\
         Log: {log_label}\n\
         Log File Path: {log_path}\n\
         End Simulator Configuration File.\n"
    )
}

/// A ready-made `Config` matching `config_text`'s cycle times. Tests
/// override individual fields with struct-update syntax.
pub fn test_config(policy: Policy, quantum: u32) -> Config {
    Config {
        version: 3.0,
        meta_data_path: PathBuf::from("programs.mdf"),
        policy,
        quantum_cycles: quantum,
        processor_cycle_ms: 10,
        monitor_cycle_ms: 20,
        hard_drive_cycle_ms: 15,
        printer_cycle_ms: 25,
        keyboard_cycle_ms: 50,
        log_sink: LogSink::Screen,
        log_path: PathBuf::from("run.log"),
    }
}

/// Assemble a meta-data stream from program bodies.
///
/// Each body is the `;`-separated operations between `A(start)0` and
/// `A(end)0`, e.g. `"I(keyboard)2; P(run)1"`. An empty body produces an
/// empty program.
pub fn meta_text(programs: &[&str]) -> String {
    let mut stream = String::from("S(start)0");
    for body in programs {
        stream.push_str("; A(start)0");
        let body = body.trim();
        if !body.is_empty() {
            stream.push_str("; ");
            stream.push_str(body);
        }
        stream.push_str("; A(end)0");
    }
    stream.push_str("; S(end)0.");
    format!("{}\n{stream}\n{}\n", metadata::HEADER, metadata::FOOTER)
}
