// ABOUTME: User-facing progress logging for the rockslide application
// ABOUTME: Wraps an optional verbose sink next to the `log` facade used for diagnostics

use log::{debug, Level};
use std::fmt;
use std::sync::Arc;

/// A callable receiving `(message, severity)` pairs.
pub type LogSink = Arc<dyn Fn(&str, Level) + Send + Sync>;

/// Progress logger handed to the walker and to every macro.
///
/// Messages always reach the `log` facade at debug level. The sink only
/// sees them when verbose mode is on.
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<LogSink>,
    verbose: bool,
}

impl Logger {
    pub fn new(sink: Option<LogSink>, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    /// A logger that drops everything except `log` diagnostics.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn log(&self, message: &str, level: Level) {
        debug!("[{}] {}", level, message);
        if !self.verbose {
            return;
        }
        if let Some(sink) = &self.sink {
            sink(message, level);
        }
    }

    pub fn notice(&self, message: &str) {
        self.log(message, Level::Info);
    }

    pub fn warning(&self, message: &str) {
        self.log(message, Level::Warn);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sink", &self.sink.is_some())
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Sink printing to stderr, used by the command line interface.
pub fn stderr_sink() -> LogSink {
    Arc::new(|message: &str, level: Level| match level {
        Level::Error | Level::Warn => eprintln!("{}: {}", level.as_str().to_lowercase(), message),
        _ => eprintln!("{}", message),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Logger recording every sink message, for assertions in tests.
    pub fn recording_logger() -> (Logger, Arc<Mutex<Vec<(String, Level)>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let captured = records.clone();
        let sink: LogSink = Arc::new(move |message: &str, level: Level| {
            captured
                .lock()
                .expect("log records poisoned")
                .push((message.to_string(), level));
        });
        (Logger::new(Some(sink), true), records)
    }
}
