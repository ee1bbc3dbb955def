//! Builder for executing external tool commands.
//!
//! Invocations are synchronous and have no timeout: the pipeline runs on its
//! own worker thread and a hung tool hangs only that run.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use dubforge_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let output = ToolCommand::new("ffmpeg", PathBuf::from("/usr/bin/ffmpeg"))
///     .arg("-hide_banner")
///     .arg("-version")
///     .execute()?;
/// println!("{}", output.stdout);
/// # Ok::<(), dubforge_common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command. `name` is used in error messages.
    pub fn new(name: impl Into<String>, program: PathBuf) -> Self {
        Self {
            name: name.into(),
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTool`] if the executable cannot be spawned because it
    ///   does not exist.
    /// - [`Error::ToolFailed`] if the process exits with a non-zero status
    ///   (carries the exit code and stderr).
    /// - [`Error::Unexpected`] for any other spawn or wait failure.
    pub fn execute(&self) -> Result<ToolOutput> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Running {} {:?}", self.program.display(), self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::missing_tool(&self.name),
                _ => Error::unexpected(format!("failed to spawn {}: {e}", self.name)),
            })?;

        let tool_output = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool_failed(
                &self.name,
                tool_output.code,
                tool_output.stderr,
            ));
        }

        Ok(tool_output)
    }
}
