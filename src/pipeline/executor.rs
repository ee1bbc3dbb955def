use super::{ActionId, ActionRegistry, RunLogger, StepEnv, WorkContext};
use crate::config::Settings;
use crate::translate::Translator;
use dubforge_av::ToolGateway;
use dubforge_common::Error;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything needed to start one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub url: String,
    pub output_dir: PathBuf,
    /// External audio for the merge step.
    pub audio: Option<PathBuf>,
    /// Requested action identifiers, as keys or long names.
    pub actions: Vec<String>,
    pub settings: Settings,
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Why a run aborted.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    /// Step that failed, `None` when the run aborted before any step.
    pub action: Option<ActionId>,
    pub category: &'static str,
    pub message: String,
}

/// Outcome of [`PipelineExecutor::run`].
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    /// Steps that finished without a fatal error, in execution order.
    pub executed: Vec<ActionId>,
    pub failure: Option<RunFailure>,
    /// Final context; absent when the run aborted before creating one.
    pub context: Option<WorkContext>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Completed
    }
}

/// Runs resolved actions sequentially against a fresh [`WorkContext`].
pub struct PipelineExecutor {
    registry: Arc<ActionRegistry>,
    gateway: Arc<dyn ToolGateway>,
    translator: Arc<dyn Translator>,
    logger: RunLogger,
    state: RunState,
}

impl PipelineExecutor {
    /// Executor over the built-in action table.
    pub fn new(gateway: Arc<dyn ToolGateway>, translator: Arc<dyn Translator>) -> Self {
        Self {
            registry: ActionRegistry::builtin(),
            gateway,
            translator,
            logger: RunLogger::new(),
            state: RunState::Idle,
        }
    }

    pub fn with_registry(mut self, registry: Arc<ActionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute `request`.
    ///
    /// Order resolution and tool preflight happen before a context exists; a
    /// failure there aborts the run with no context. Afterwards each step runs
    /// in order and the first fatal error aborts the rest. A completion summary
    /// of the artifacts on disk is logged whenever a context was created.
    pub fn run(&mut self, request: PipelineRequest) -> RunReport {
        self.state = RunState::Running;
        let log = self.logger.clone();
        log.info(format!("Starting pipeline for {}", request.url));

        let order = self.registry.resolve_order(&request.actions, &log);
        if order.is_empty() {
            let err = Error::config("no valid actions requested");
            return self.abort(None, &err, Vec::new(), None);
        }
        log.info(format!(
            "Execution order: {}",
            order
                .iter()
                .map(|id| id.key())
                .collect::<Vec<_>>()
                .join(" -> ")
        ));

        for tool in self.registry.required_tools(&order) {
            match self.gateway.resolve(tool) {
                Ok(path) => log.debug(format!("Using {}: {}", tool, path.display())),
                Err(e) => return self.abort(None, &e, Vec::new(), None),
            }
        }

        let mut ctx = WorkContext::new(
            request.url,
            request.output_dir,
            request.audio,
            request.settings,
        );
        let env = StepEnv {
            gateway: self.gateway.as_ref(),
            translator: self.translator.as_ref(),
            log: &log,
        };

        let total = order.len();
        let mut executed = Vec::with_capacity(total);
        let mut failure = None;

        for (i, id) in order.iter().copied().enumerate() {
            let Some(descriptor) = self.registry.get(id) else {
                continue;
            };
            log.info(format!("[{}/{}] {}", i + 1, total, id.label()));

            let result = if descriptor.requires_identity && ctx.base().is_none() {
                Err(Error::precondition(format!(
                    "{} needs the base name, but the metadata step has not set it",
                    id.label()
                )))
            } else {
                descriptor.step.execute(&mut ctx, &env)
            };

            match result {
                Ok(()) => executed.push(id),
                Err(e) if !e.is_fatal() => {
                    log.warn(format!("{}: {}", id.label(), e));
                    executed.push(id);
                }
                Err(e) => {
                    failure = Some((id, e));
                    break;
                }
            }
        }

        self.log_summary(&ctx);

        match failure {
            Some((id, e)) => self.abort(Some(id), &e, executed, Some(ctx)),
            None => {
                self.state = RunState::Completed;
                log.info("Pipeline completed successfully.");
                RunReport {
                    state: self.state,
                    executed,
                    failure: None,
                    context: Some(ctx),
                }
            }
        }
    }

    fn abort(
        &mut self,
        action: Option<ActionId>,
        err: &Error,
        executed: Vec<ActionId>,
        context: Option<WorkContext>,
    ) -> RunReport {
        let log = &self.logger;
        let step = action.map(|id| id.label()).unwrap_or("Pipeline");

        if err.is_unexpected() {
            log.error(format!("{} hit an unexpected error: {}", step, err));
            log.error(format!("Details: {:?}", err));
            let mut source = std::error::Error::source(err);
            while let Some(cause) = source {
                log.error(format!("Caused by: {}", cause));
                source = cause.source();
            }
        } else {
            log.error(format!("{} failed [{}]: {}", step, err.category(), err));
        }
        log.error("Pipeline aborted.");

        self.state = RunState::Aborted;
        RunReport {
            state: self.state,
            executed,
            failure: Some(RunFailure {
                action,
                category: err.category(),
                message: err.to_string(),
            }),
            context,
        }
    }

    fn log_summary(&self, ctx: &WorkContext) {
        let log = &self.logger;
        let existing = ctx.existing_artifacts();
        if existing.is_empty() {
            log.info("No artifacts on disk.");
            return;
        }
        log.info("Artifacts:");
        for (artifact, path) in existing {
            log.info(format!("  {}: {}", artifact, path.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubforge_av::{Tool, ToolOutput};
    use dubforge_common::Result;
    use std::path::Path;

    struct NoTools;

    impl ToolGateway for NoTools {
        fn resolve(&self, tool: Tool) -> Result<PathBuf> {
            Err(Error::missing_tool(tool.name()))
        }

        fn invoke(&self, tool: Tool, _args: &[String]) -> Result<ToolOutput> {
            Err(Error::missing_tool(tool.name()))
        }
    }

    struct Echo;

    impl Translator for Echo {
        fn translate(&self, text: &str, _: &str, _: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    fn request(actions: &[&str]) -> PipelineRequest {
        PipelineRequest {
            url: "https://example.com/v".into(),
            output_dir: Path::new("/nonexistent/out").to_path_buf(),
            audio: None,
            actions: actions.iter().map(|s| s.to_string()).collect(),
            settings: Settings::default(),
        }
    }

    #[test]
    fn starts_idle() {
        let exec = PipelineExecutor::new(Arc::new(NoTools), Arc::new(Echo));
        assert_eq!(exec.state(), RunState::Idle);
    }

    #[test]
    fn empty_order_aborts_without_context() {
        let mut exec = PipelineExecutor::new(Arc::new(NoTools), Arc::new(Echo));
        let report = exec.run(request(&["bogus"]));
        assert_eq!(report.state, RunState::Aborted);
        assert_eq!(exec.state(), RunState::Aborted);
        assert!(report.context.is_none());
        assert_eq!(report.failure.unwrap().category, "configuration");
    }

    #[test]
    fn missing_tool_aborts_in_preflight() {
        let mut exec = PipelineExecutor::new(Arc::new(NoTools), Arc::new(Echo));
        let report = exec.run(request(&["dv"]));
        assert_eq!(report.state, RunState::Aborted);
        assert!(report.context.is_none());
        assert!(report.executed.is_empty());
        let failure = report.failure.unwrap();
        assert_eq!(failure.category, "missing tool");
        assert!(failure.action.is_none());
    }
}
