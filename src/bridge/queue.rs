use super::Event;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Unbounded FIFO shared between workers and the consumer.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<Event>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.inner.lock().push_back(event);
    }

    /// Pop the oldest event without blocking on new ones.
    pub fn pop(&self) -> Option<Event> {
        self.inner.lock().pop_front()
    }

    /// Take every queued event, oldest first.
    pub fn pop_all(&self) -> Vec<Event> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
