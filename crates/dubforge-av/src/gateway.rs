//! The seam between pipeline steps and real processes.
//!
//! Steps never spawn processes directly; they call a [`ToolGateway`]. The
//! production implementation is [`SystemGateway`], which resolves executables
//! through a [`ToolRegistry`] and runs them with [`ToolCommand`].

use std::path::PathBuf;

use crate::{Result, Tool, ToolCommand, ToolOutput, ToolPaths, ToolRegistry};

/// Resolves and invokes named external tools.
pub trait ToolGateway: Send + Sync {
    /// Resolve the executable for `tool` without running it.
    fn resolve(&self, tool: Tool) -> Result<PathBuf>;

    /// Run `tool` with `args`, returning the captured output.
    ///
    /// A non-zero exit must surface as [`crate::Error::ToolFailed`].
    fn invoke(&self, tool: Tool, args: &[String]) -> Result<ToolOutput>;
}

/// [`ToolGateway`] backed by the host system.
#[derive(Debug, Clone)]
pub struct SystemGateway {
    registry: ToolRegistry,
}

impl SystemGateway {
    /// Wrap an existing registry.
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Discover tools using the given overrides.
    pub fn discover(paths: &ToolPaths) -> Self {
        Self::new(ToolRegistry::discover(paths))
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl ToolGateway for SystemGateway {
    fn resolve(&self, tool: Tool) -> Result<PathBuf> {
        self.registry.require(tool).map(|p| p.to_path_buf())
    }

    fn invoke(&self, tool: Tool, args: &[String]) -> Result<ToolOutput> {
        let program = self.resolve(tool)?;
        ToolCommand::new(tool.name(), program).args(args).execute()
    }
}
