//! Timestamped diagnostic output.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

/// Millisecond timestamp in the style `Jan  2 15:04:05.000`.
const STAMP_MILLI: &str = "%b %e %H:%M:%S%.3f";

/// Cloneable handle on a diagnostic output sink.
///
/// Each line is prefixed with a local timestamp. Write failures are ignored:
/// diagnostics never fail a repository operation.
#[derive(Clone)]
pub struct DebugLog {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DebugLog {
    /// Wraps a writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes one timestamped line.
    pub fn log(&self, args: fmt::Arguments<'_>) {
        let now = Local::now().format(STAMP_MILLI);
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{now} {args}");
        let _ = sink.flush();
    }
}

impl fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLog").finish_non_exhaustive()
    }
}
