use crate::pipeline::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which task produced an event. Each origin runs at most one task at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The URL pipeline.
    Url,
    /// The standalone trim task.
    Trim,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Url => "url",
            Origin::Trim => "trim",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    Finished,
    Error,
}

impl Status {
    /// Whether this status ends a task.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Finished | Status::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Log { level: Level, message: String },
    Status { status: Status },
}

/// A message relayed from a worker to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn log(origin: Origin, level: Level, message: impl Into<String>) -> Self {
        Self {
            origin,
            timestamp: Utc::now(),
            kind: EventKind::Log {
                level,
                message: message.into(),
            },
        }
    }

    pub fn status(origin: Origin, status: Status) -> Self {
        Self {
            origin,
            timestamp: Utc::now(),
            kind: EventKind::Status { status },
        }
    }

    /// The terminal status carried by this event, if any.
    pub fn terminal_status(&self) -> Option<Status> {
        match self.kind {
            EventKind::Status { status } if status.is_terminal() => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.timestamp.format("%H:%M:%S");
        match &self.kind {
            EventKind::Log { level, message } => write!(
                f,
                "{} [{}] {:<5} {}",
                time,
                self.origin,
                level.to_string().to_uppercase(),
                message
            ),
            EventKind::Status { status } => {
                let status = match status {
                    Status::Running => "running",
                    Status::Finished => "finished",
                    Status::Error => "error",
                };
                write!(f, "{} [{}] status: {}", time, self.origin, status)
            }
        }
    }
}
