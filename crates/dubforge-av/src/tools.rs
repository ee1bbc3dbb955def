//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the external
//! CLI tools the pipeline shells out to (`yt-dlp`, `ffmpeg`) and provides
//! lookup methods for the rest of the crate.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An external executable the pipeline knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// The media downloader.
    YtDlp,
    /// The transcoder.
    Ffmpeg,
}

impl Tool {
    /// Every tool the registry manages.
    pub const ALL: [Tool; 2] = [Tool::YtDlp, Tool::Ffmpeg];

    /// Executable name as looked up on `PATH`.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::YtDlp => "yt-dlp",
            Tool::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            Tool::YtDlp => "--version",
            Tool::Ffmpeg => "-version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit executable overrides, usually read from the `[tools]` config table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolPaths {
    /// Path to `yt-dlp`.
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,
    /// Path to `ffmpeg`.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

impl ToolPaths {
    /// Configured override for `tool`, if any.
    pub fn get(&self, tool: Tool) -> Option<&Path> {
        match tool {
            Tool::YtDlp => self.yt_dlp_path.as_deref(),
            Tool::Ffmpeg => self.ffmpeg_path.as_deref(),
        }
    }
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of the version output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool locations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<Tool, PathBuf>,
}

impl ToolRegistry {
    /// Discover tools, checking configured overrides before `PATH`.
    ///
    /// An override is used only when it points at an existing executable file;
    /// otherwise it is ignored (with a warning) and [`which::which`] decides.
    /// Tools that are not found are omitted from the registry.
    pub fn discover(paths: &ToolPaths) -> Self {
        let mut tools = BTreeMap::new();
        for tool in Tool::ALL {
            if let Some(path) = locate(tool, paths.get(tool)) {
                tools.insert(tool, path);
            }
        }
        Self { tools }
    }

    /// Build a registry from already-known locations.
    pub fn from_paths(entries: impl IntoIterator<Item = (Tool, PathBuf)>) -> Self {
        Self {
            tools: entries.into_iter().collect(),
        }
    }

    /// Return the resolved path for `tool`, or [`Error::MissingTool`].
    pub fn require(&self, tool: Tool) -> Result<&Path> {
        self.tools
            .get(&tool)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::missing_tool(tool.name()))
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        Tool::ALL
            .iter()
            .map(|&tool| match self.tools.get(&tool) {
                Some(path) => ToolInfo {
                    name: tool.name().to_string(),
                    available: true,
                    version: detect_version(tool, path),
                    path: Some(path.clone()),
                },
                None => ToolInfo {
                    name: tool.name().to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Resolve one tool: explicit override first, then a system lookup.
fn locate(tool: Tool, configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            return Some(path.to_path_buf());
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "Configured path for {} is not an executable file: {}",
            tool,
            path.display()
        );
    }
    which::which(tool.name()).ok()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run the tool's version flag and return the first line of stdout.
fn detect_version(tool: Tool, path: &Path) -> Option<String> {
    let output = Command::new(path).arg(tool.version_arg()).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
