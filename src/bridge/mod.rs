//! Background execution and event relay.
//!
//! A [`Bridge`] runs at most one task per [`Origin`] on its own thread and
//! relays every log line and status change through a shared FIFO. The
//! consumer polls [`Bridge::drain`] and never blocks on pipeline work.
//!
//! For every accepted task the queue receives, in order: one
//! [`Status::Running`], the task's log lines, and exactly one terminal
//! status ([`Status::Finished`] or [`Status::Error`]). A rejected start
//! produces a single warning line and nothing else.

mod events;
mod queue;
mod slot;

pub use events::{Event, EventKind, Origin, Status};
pub use queue::EventQueue;
pub use slot::{RunSlot, SlotGuard};

use crate::pipeline::{Level, PipelineExecutor, PipelineRequest, RunLogger};
use crate::trim::run_trim;
use dubforge_av::actions::TrimSpec;
use dubforge_av::ToolGateway;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Decouples task execution from a polling consumer.
#[derive(Debug, Clone)]
pub struct Bridge {
    queue: EventQueue,
    url_slot: Arc<RunSlot>,
    trim_slot: Arc<RunSlot>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            queue: EventQueue::new(),
            url_slot: RunSlot::new(),
            trim_slot: RunSlot::new(),
        }
    }

    fn slot(&self, origin: Origin) -> &Arc<RunSlot> {
        match origin {
            Origin::Url => &self.url_slot,
            Origin::Trim => &self.trim_slot,
        }
    }

    /// Whether a task for `origin` is in flight.
    pub fn is_busy(&self, origin: Origin) -> bool {
        self.slot(origin).is_busy()
    }

    /// Run `task` on a worker thread.
    ///
    /// The task receives a logger whose lines are relayed as events and
    /// returns whether it succeeded. Returns `false` without spawning when a
    /// task for the same origin is already running.
    pub fn start<F>(&self, origin: Origin, task: F) -> bool
    where
        F: FnOnce(RunLogger) -> bool + Send + 'static,
    {
        let Some(guard) = self.slot(origin).try_acquire() else {
            tracing::warn!("{} task already running, request ignored", origin);
            self.queue.push(Event::log(
                origin,
                Level::Warn,
                format!("A {} task is already running.", origin),
            ));
            return false;
        };

        self.queue.push(Event::status(origin, Status::Running));

        let queue = self.queue.clone();
        let spawned = thread::Builder::new()
            .name(format!("dubforge-{}", origin))
            .spawn(move || {
                let sink = queue.clone();
                let logger = RunLogger::with_sink(Box::new(move |level, message| {
                    sink.push(Event::log(origin, level, message));
                }));

                let status = match panic::catch_unwind(AssertUnwindSafe(|| task(logger))) {
                    Ok(true) => Status::Finished,
                    Ok(false) => Status::Error,
                    Err(payload) => {
                        let message = format!("Worker panicked: {}", panic_message(&*payload));
                        tracing::error!("{}", message);
                        queue.push(Event::log(origin, Level::Error, message));
                        Status::Error
                    }
                };
                queue.push(Event::status(origin, status));
                drop(guard);
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn {} worker: {}", origin, e);
            self.queue.push(Event::log(
                origin,
                Level::Error,
                format!("Failed to start worker: {}", e),
            ));
            self.queue.push(Event::status(origin, Status::Error));
            return false;
        }

        true
    }

    /// Run a pipeline on the `url` origin.
    pub fn start_pipeline(&self, executor: PipelineExecutor, request: PipelineRequest) -> bool {
        self.start(Origin::Url, move |logger| {
            executor.with_logger(logger).run(request).succeeded()
        })
    }

    /// Run a trim on the `trim` origin.
    pub fn start_trim(&self, gateway: Arc<dyn ToolGateway>, spec: TrimSpec) -> bool {
        self.start(Origin::Trim, move |logger| {
            run_trim(gateway.as_ref(), &spec, &logger).is_ok()
        })
    }

    /// Pop the oldest pending event, if any. Never blocks.
    pub fn drain(&self) -> Option<Event> {
        self.queue.pop()
    }

    /// Pop every pending event, oldest first.
    pub fn drain_all(&self) -> Vec<Event> {
        self.queue.pop_all()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
