//! Console dispatcher.

use std::fmt;
use std::io::{self, Write};

use cardio_types::{format_console_line, PatientId};
use parking_lot::Mutex;
use tracing::debug;

use super::Dispatcher;

/// Writes each reading as one line to standard output.
///
/// Each call writes its whole line with a single `write_all` on a locked
/// handle, so concurrent callers interleave by line, never mid-line.
pub struct ConsoleDispatcher {
    sink: Sink,
}

enum Sink {
    Stdout,
    Writer(Mutex<Box<dyn Write + Send>>),
}

impl ConsoleDispatcher {
    /// Create a dispatcher that prints to stdout.
    pub fn new() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// Create a dispatcher that prints to an arbitrary writer instead of stdout.
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Sink::Writer(Mutex::new(Box::new(writer))),
        }
    }

    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        match &self.sink {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line)?;
                out.flush()
            }
            Sink::Writer(writer) => {
                let mut out = writer.lock();
                out.write_all(line)?;
                out.flush()
            }
        }
    }
}

impl Default for ConsoleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            Sink::Stdout => "stdout",
            Sink::Writer(_) => "writer",
        };
        f.debug_struct("ConsoleDispatcher")
            .field("sink", &sink)
            .finish()
    }
}

impl Dispatcher for ConsoleDispatcher {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        let mut line = format_console_line(patient_id, timestamp_ms, label, data);
        line.push('\n');

        // A closed stdout is not worth more than a debug note
        if let Err(e) = self.write_line(line.as_bytes()) {
            debug!(error = %e, "console write failed");
        }
    }
}
