/*!
Error taxonomy for the simulator.

Three families, matching where a failure can occur:
- `ConfigError`: the configuration file could not be read or understood.
- `MetaDataError`: the program meta-data stream is malformed.
- `SimError`: umbrella for the entry point, plus fatal invariant
  violations detected during a run (e.g. an I/O completion for a pid the
  scheduler has never blocked).

Loader errors abort before the scheduler starts; the scheduler never
recovers from an invariant violation.
*/

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::program::Pid;

/// Failures while loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to open config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("incorrect config file format: missing `Start Simulator Configuration File` header")]
    MalformedHeader,

    #[error("incorrect config file format: missing `End Simulator Configuration File.` footer")]
    MalformedFooter,

    #[error("incorrect config file format: expected `{0}` field")]
    MissingField(&'static str),

    #[error("invalid value `{value}` for config field `{field}`")]
    BadValue { field: &'static str, value: String },

    #[error("unrecognized scheduling code `{0}`")]
    UnknownSchedulingCode(String),

    #[error("unrecognized log location `{0}`")]
    UnknownLogSink(String),

    #[error("wrong simulator version: expected {expected}, given {given}")]
    VersionMismatch { expected: f32, given: f32 },

    #[error("unable to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while loading or validating the program meta-data stream.
#[derive(Debug, Error)]
pub enum MetaDataError {
    #[error("unable to open meta-data file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("incorrect meta-data file format: missing `Start Program Meta-Data Code:` header")]
    MissingHeader,

    #[error("incorrect meta-data file format: missing `End Program Meta-Data Code.` footer")]
    MissingFooter,

    #[error("incorrect meta-data file format: simulator start flag `S(start)0` is missing")]
    MissingSimStart,

    #[error("incorrect meta-data file format: simulator end flag `S(end)0.` is missing")]
    MissingSimEnd,

    #[error("malformed meta-data token `{0}`")]
    MalformedToken(String),

    #[error("unrecognized operation type `{0}`")]
    UnknownOpType(char),

    #[error("unrecognized operation descriptor `{0}`")]
    UnknownDescriptor(String),

    #[error("descriptor `{descriptor}` is not valid for operation type `{kind}`")]
    IncompatibleDescriptor { kind: char, descriptor: String },

    #[error("invalid cycle count in meta-data token `{0}`")]
    BadCycleCount(String),

    #[error("boundary token `{0}` must carry zero cycles")]
    BoundaryCycles(String),

    #[error("program is missing its `A(end)0` terminator")]
    UnterminatedProgram,

    #[error("operation token `{0}` appears outside an `A(start)0 .. A(end)0` program block")]
    TokenOutsideProgram(String),
}

/// Top-level simulator error: loader failures plus fatal runtime
/// invariant violations.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    MetaData(#[from] MetaDataError),

    #[error("internal error: I/O completion for unknown process {0}")]
    UnknownPid(Pid),

    #[error("internal error: process {0} was dispatched with an empty operation queue")]
    EmptyDispatch(Pid),
}
