//! Unified error type for dubforge.
//!
//! The variants follow the categories the pipeline executor distinguishes when
//! a step fails: a missing tool or input, an external tool exiting non-zero,
//! a bad configuration value, a failed artifact write, or something nobody
//! anticipated.

use std::path::PathBuf;

/// Unified error type covering all failure modes in dubforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external executable could not be resolved.
    #[error("required tool not found: {tool}")]
    MissingTool {
        /// Tool name as invoked (e.g. "yt-dlp").
        tool: String,
    },

    /// An input file the step depends on does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// An external tool ran but exited unsuccessfully.
    #[error("{tool} exited with {}: {}", code_label(*code), stderr.trim())]
    ToolFailed {
        /// Tool name.
        tool: String,
        /// Exit code, `None` when the process was killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// A settings or request value is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An artifact could not be written (or did not appear after the tool ran).
    #[error("failed to write {}: {source}", path.display())]
    ArtifactWrite {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A step was reached without the state it depends on.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The translation backend rejected or failed a request.
    #[error("translation failed: {0}")]
    Translation(String),

    /// Catch-all for anything not covered above.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

fn code_label(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code".to_string(),
    }
}

impl Error {
    /// Stable, human-readable label for the failure category.
    pub fn category(&self) -> &'static str {
        match self {
            Error::MissingTool { .. } => "missing tool",
            Error::MissingFile { .. } => "missing file",
            Error::ToolFailed { .. } => "external tool failure",
            Error::Config(_) => "configuration",
            Error::ArtifactWrite { .. } => "artifact write",
            Error::Precondition(_) => "precondition",
            Error::Translation(_) => "translation",
            Error::Unexpected(_) => "unexpected",
        }
    }

    /// Whether a pipeline step failing with this error must abort the run.
    ///
    /// Translation failures are reported per text unit and never abort.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Translation(_))
    }

    /// Whether this error falls outside the anticipated categories.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Error::Unexpected(_))
    }

    /// Convenience constructor for [`Error::MissingTool`].
    pub fn missing_tool(tool: impl Into<String>) -> Self {
        Error::MissingTool { tool: tool.into() }
    }

    /// Convenience constructor for [`Error::MissingFile`].
    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Error::MissingFile { path: path.into() }
    }

    /// Convenience constructor for [`Error::ToolFailed`].
    pub fn tool_failed(
        tool: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Error::ToolFailed {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Convenience constructor for [`Error::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Convenience constructor for [`Error::ArtifactWrite`].
    pub fn artifact_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ArtifactWrite {
            path: path.into(),
            source,
        }
    }

    /// Artifact write failure for an output the tool was expected to create.
    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Error::ArtifactWrite {
            path: path.into(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "expected output was not produced",
            ),
        }
    }

    /// Convenience constructor for [`Error::Precondition`].
    pub fn precondition(msg: impl Into<String>) -> Self {
        Error::Precondition(msg.into())
    }

    /// Convenience constructor for [`Error::Translation`].
    pub fn translation(msg: impl Into<String>) -> Self {
        Error::Translation(msg.into())
    }

    /// Convenience constructor for [`Error::Unexpected`].
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Error::Unexpected(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Unexpected(format!("I/O error: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(format!("JSON error: {err}"))
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
