//! Deferred work queue ("next tick").
//!
//! Work the loader must not run synchronously inside a load pass is queued
//! here and drained by the host once control returns to its event loop.
//! Single-threaded by construction; tasks are plain `FnOnce()` closures.

#[cfg(test)]
#[path = "tick_test.rs"]
mod tick_test;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct TickQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TickQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next call to [`TickQueue::run_pending`].
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run every task queued before this call, in FIFO order. Tasks deferred
    /// while draining wait for the next call. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.tasks.borrow_mut());
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl fmt::Debug for TickQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickQueue").field("pending", &self.len()).finish()
    }
}
