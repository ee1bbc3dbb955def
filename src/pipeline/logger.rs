use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Severity of a run log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        })
    }
}

/// Log sink callback type
pub type LogCallback = Box<dyn Fn(Level, &str) + Send + Sync>;

/// Logging handle given to every step of a run.
///
/// Each call emits a `tracing` event and, when a sink is attached, forwards
/// the same line with its severity to it.
#[derive(Clone, Default)]
pub struct RunLogger {
    sink: Option<Arc<LogCallback>>,
}

impl RunLogger {
    /// A logger that only emits `tracing` events.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(callback: LogCallback) -> Self {
        Self {
            sink: Some(Arc::new(callback)),
        }
    }

    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        let message = message.as_ref();
        match level {
            Level::Debug => tracing::debug!("{}", message),
            Level::Info => tracing::info!("{}", message),
            Level::Warn => tracing::warn!("{}", message),
            Level::Error => tracing::error!("{}", message),
        }
        if let Some(ref sink) = self.sink {
            sink(level, message);
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message);
    }
}

impl fmt::Debug for RunLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLogger")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
