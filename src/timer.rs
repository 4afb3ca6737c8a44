//! Pausable repeating timer.
//!
//! DESIGN
//! ======
//! The countdown runs on a Tokio task. `pause` aborts the task and records how
//! much of the current period was left; `resume` spawns a fresh task that
//! first waits that remainder and then settles into the full period. `reset`
//! only rewinds the bookkeeping: a countdown already in flight keeps running.
//!
//! Aborting a task only lands at its next `.await`, so a task that already
//! woke from its sleep may still reach the state lock after `pause` returns.
//! Every pause bumps a generation counter; a task whose generation is stale
//! exits without touching the state or firing.
//!
//! Time comes from `tokio::time::Instant`, so a paused test clock drives it.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

type Callback = Box<dyn FnMut() + Send>;

struct TimerState {
    delay: Duration,
    remaining: Duration,
    started: Instant,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

pub struct Timer {
    state: Arc<Mutex<TimerState>>,
    callback: Arc<Mutex<Callback>>,
}

impl Timer {
    /// Start a timer that invokes `callback` every `delay`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(delay: Duration, callback: impl FnMut() + Send + 'static) -> Self {
        let timer = Self {
            state: Arc::new(Mutex::new(TimerState {
                delay,
                remaining: delay,
                started: Instant::now(),
                generation: 0,
                task: None,
            })),
            callback: Arc::new(Mutex::new(Box::new(callback))),
        };
        timer.resume();
        timer
    }

    /// Stop the countdown and remember how much of the period was left.
    /// No-op when already paused.
    pub fn pause(&self) {
        let mut state = lock(&self.state);
        let Some(task) = state.task.take() else {
            return;
        };
        task.abort();
        state.generation += 1;
        let elapsed = state.started.elapsed();
        state.remaining = state.remaining.saturating_sub(elapsed);
        debug!(remaining_ms = state.remaining.as_millis(), "timer paused");
    }

    /// Continue the countdown from the remaining time. No-op when running.
    pub fn resume(&self) {
        let mut state = lock(&self.state);
        if state.task.is_some() {
            return;
        }
        state.started = Instant::now();
        let first = state.remaining;
        let shared = Arc::clone(&self.state);
        let callback = Arc::clone(&self.callback);
        let generation = state.generation;
        state.task = Some(tokio::spawn(run(shared, callback, first, generation)));
    }

    /// Restore the remaining time to the full delay. Does not restart an
    /// in-flight countdown.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.remaining = state.delay;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        lock(&self.state).task.is_none()
    }

    /// Time left in the current period as of the last pause or reset.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        lock(&self.state).remaining
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        lock(&self.state).delay
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.state).task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Timer")
            .field("delay", &state.delay)
            .field("remaining", &state.remaining)
            .field("paused", &state.task.is_none())
            .finish_non_exhaustive()
    }
}

async fn run(state: Arc<Mutex<TimerState>>, callback: Arc<Mutex<Callback>>, first: Duration, generation: u64) {
    let mut wait = first;
    loop {
        tokio::time::sleep(wait).await;
        let mut fire = {
            let mut state = lock(&state);
            if state.generation != generation {
                debug!("stale timer task exiting");
                return;
            }
            state.remaining = state.delay;
            state.started = Instant::now();
            wait = state.delay;
            // Taken before the state guard drops so a later pause orders after this fire.
            lock(&callback)
        };
        (*fire)();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
