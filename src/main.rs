/*!
`sim` binary: load a configuration, replay its program batch, exit.

Exit status is 0 on normal completion and 1 when configuration or
meta-data loading fails (or the scheduler hits a fatal internal error);
the failure is reported on stderr. Diagnostics go to stderr through
`tracing`, filtered by `RUST_LOG`, so the simulator's event log owns
stdout.
*/

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ossim::logger::EventLog;
use ossim::scheduler::Scheduler;
use ossim::{metadata, Config, SimError};

/// Educational OS simulator: replays a program batch under a
/// configurable CPU scheduling policy.
#[derive(Parser)]
#[command(name = "sim", version)]
struct Cli {
    /// Path to the simulator configuration file.
    config: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &Path) -> Result<(), SimError> {
    let config = Config::load(config_path)?;
    let programs = metadata::load(&config.meta_data_path, &config)?;

    let log = Arc::new(EventLog::from_config(&config)?);
    let mut scheduler = Scheduler::new(programs, &config, Arc::clone(&log));
    let outcome = scheduler.run();
    log.flush();
    outcome
}
