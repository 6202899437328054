//! Cooperative on/off switch shared between a controlling thread and a worker loop.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct SignalState {
    enabled: bool,
    stopped: bool,
}

#[derive(Debug)]
pub struct EnableSignal {
    state: Mutex<SignalState>,
    changed: Condvar,
}

impl EnableSignal {
    pub fn new(enabled: bool) -> Self {
        Self {
            state: Mutex::new(SignalState {
                enabled,
                stopped: false,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enable(&self) {
        self.lock().enabled = true;
        self.changed.notify_all();
    }

    /// Returns only once no `when_enabled` closure is running, so work
    /// admitted before the call is already handed off when it returns.
    pub fn disable(&self) {
        self.lock().enabled = false;
        self.changed.notify_all();
    }

    pub fn stop(&self) {
        self.lock().stopped = true;
        self.changed.notify_all();
    }

    pub fn is_enabled(&self) -> bool {
        let state = self.lock();
        state.enabled && !state.stopped
    }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Blocks until the signal is enabled, then runs `f` while still holding
    /// the signal lock. Returns `None` once the signal is stopped.
    pub fn when_enabled<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.stopped {
                return None;
            }
            if state.enabled {
                return Some(f());
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Sleeps for `duration` unless stopped first. Returns `false` if stopped.
    pub fn pause(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut state = self.lock();
        loop {
            if state.stopped {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            state = self
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
