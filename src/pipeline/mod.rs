pub mod actions;
pub mod context;
pub mod executor;
pub mod logger;
pub mod registry;
pub mod step;

pub use context::{sanitize_base, Artifact, WorkContext};
pub use executor::{PipelineExecutor, PipelineRequest, RunFailure, RunReport, RunState};
pub use logger::{Level, LogCallback, RunLogger};
pub use registry::{ActionDescriptor, ActionId, ActionRegistry};
pub use step::{Step, StepEnv};
