use super::{RunLogger, WorkContext};
use crate::translate::Translator;
use dubforge_av::ToolGateway;
use dubforge_common::Result;

/// Collaborators a step may use while it runs.
#[derive(Clone, Copy)]
pub struct StepEnv<'a> {
    pub gateway: &'a dyn ToolGateway,
    pub translator: &'a dyn Translator,
    pub log: &'a RunLogger,
}

/// One pipeline action.
///
/// A step checks its target artifact on disk before doing any work and, if it
/// is already there, records it in the context and returns.
pub trait Step: Send + Sync {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()>;
}
