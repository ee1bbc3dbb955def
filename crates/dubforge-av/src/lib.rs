//! # dubforge-av
//!
//! External tool plumbing for the dubforge pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- resolve `yt-dlp` and `ffmpeg`,
//!   preferring configured overrides over a `PATH` lookup.
//! - **Command execution** ([`ToolCommand`]) -- synchronous builder that
//!   captures stdout, stderr and the exit code.
//! - **The gateway seam** ([`ToolGateway`]) -- the trait pipeline steps call
//!   through, so tests can substitute a recording fake.
//! - **Tool-specific argument builders** ([`ytdlp`], [`actions`]) -- the
//!   downloader invocations, the audio mix and the trim operation.
//!
//! ## Example
//!
//! ```no_run
//! use dubforge_av::{SystemGateway, Tool, ToolGateway, ToolPaths};
//!
//! let gateway = SystemGateway::discover(&ToolPaths::default());
//! let out = gateway.invoke(Tool::Ffmpeg, &["-version".to_string()])?;
//! println!("{}", out.stdout.lines().next().unwrap_or_default());
//! # Ok::<(), dubforge_common::Error>(())
//! ```

pub mod actions;
pub mod command;
pub mod gateway;
pub mod tools;
pub mod ytdlp;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use dubforge_common::{Error, Result};
pub use gateway::{SystemGateway, ToolGateway};
pub use tools::{Tool, ToolInfo, ToolPaths, ToolRegistry};
