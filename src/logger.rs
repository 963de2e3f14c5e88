/*!
Event log: the simulator's product output.

Every OS and process event is emitted as one line,

```text
<elapsed>.6f - <message>
```

where the float is seconds since the run started. Lines are multiplexed
to the screen, a log file, or both, per the configuration; a memory sink
captures lines for assertions in tests.

Concurrency
- The scheduling thread and every I/O worker emit through the same
  `EventLog`, so the sink state sits behind a mutex. The elapsed time is
  sampled inside the critical section, which makes timestamps
  monotonically non-decreasing within each sink without any ordering
  cooperation from callers.
*/

use std::fs::File;
use std::io::{BufWriter, Write};

use parking_lot::Mutex;
use tracing::warn;

use crate::clock::SimClock;
use crate::config::{Config, LogSink};
use crate::error::ConfigError;

/// Shared, thread-safe event line writer.
pub struct EventLog {
    inner: Mutex<Inner>,
}

struct Inner {
    clock: SimClock,
    sink: Sink,
}

enum Sink {
    Screen,
    File(BufWriter<File>),
    Both(BufWriter<File>),
    Memory(Vec<String>),
}

impl EventLog {
    /// Build the sink the configuration asks for, creating the log file
    /// when one is needed.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let open = || {
            File::create(&config.log_path)
                .map(BufWriter::new)
                .map_err(|source| ConfigError::LogFile {
                    path: config.log_path.clone(),
                    source,
                })
        };
        let sink = match config.log_sink {
            LogSink::Screen => Sink::Screen,
            LogSink::File => Sink::File(open()?),
            LogSink::Both => Sink::Both(open()?),
        };
        Ok(Self::with_sink(sink))
    }

    /// Screen-only log.
    pub fn screen() -> Self {
        Self::with_sink(Sink::Screen)
    }

    /// In-memory log, for tests and embedding.
    pub fn memory() -> Self {
        Self::with_sink(Sink::Memory(Vec::new()))
    }

    fn with_sink(sink: Sink) -> Self {
        Self {
            inner: Mutex::new(Inner {
                clock: SimClock::start_now(),
                sink,
            }),
        }
    }

    /// Re-anchor the clock; called when the scheduler announces the
    /// start of the run so timestamps measure simulation time.
    pub fn restart_clock(&self) {
        self.inner.lock().clock = SimClock::start_now();
    }

    /// Emit one event line, stamped with the elapsed seconds at the
    /// moment the sink lock is held.
    pub fn emit(&self, message: &str) {
        let mut inner = self.inner.lock();
        let now = inner.clock.elapsed_seconds();
        let line = format!("{now:.6} - {message}");
        match &mut inner.sink {
            Sink::Screen => println!("{line}"),
            Sink::File(file) => write_line(file, &line),
            Sink::Both(file) => {
                println!("{line}");
                write_line(file, &line);
            }
            Sink::Memory(lines) => lines.push(line),
        }
    }

    /// Flush any buffered file output.
    pub fn flush(&self) {
        let mut inner = self.inner.lock();
        if let Sink::File(file) | Sink::Both(file) = &mut inner.sink {
            if let Err(error) = file.flush() {
                warn!(%error, "failed to flush log file");
            }
        }
    }

    /// Lines captured by a memory sink; empty for other sinks.
    pub fn captured(&self) -> Vec<String> {
        match &self.inner.lock().sink {
            Sink::Memory(lines) => lines.clone(),
            _ => Vec::new(),
        }
    }

    /// Captured messages with the timestamp prefix stripped.
    pub fn captured_messages(&self) -> Vec<String> {
        self.captured()
            .iter()
            .map(|line| match line.split_once(" - ") {
                Some((_, message)) => message.to_string(),
                None => line.clone(),
            })
            .collect()
    }

    /// Captured timestamps, in emission order.
    pub fn captured_timestamps(&self) -> Vec<f64> {
        self.captured()
            .iter()
            .filter_map(|line| line.split_once(" - "))
            .filter_map(|(stamp, _)| stamp.parse().ok())
            .collect()
    }
}

fn write_line(file: &mut BufWriter<File>, line: &str) {
    if let Err(error) = writeln!(file, "{line}") {
        warn!(%error, "failed to write log line");
    }
}
