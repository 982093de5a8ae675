//! Subscriptions and their run state.

use crate::logger::{status_error, status_success};
use crate::ops::{Cascade, Executor, OperationId};
use crate::source::SourceSet;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::time::Instant;

/// An armed watch: when one of `sources` changes, run `cascade`.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: OperationId,
    pub name: String,
    pub sources: SourceSet,
    pub cascade: Cascade,
}

impl Subscription {
    pub fn matches_any(&self, paths: &[PathBuf]) -> bool {
        paths.iter().any(|path| self.sources.matches(path))
    }
}

#[derive(Debug, Default)]
struct RunState {
    running: bool,
    /// A change arrived while running; run once more afterwards.
    pending: bool,
}

/// A subscription plus the state that serializes its runs.
#[derive(Debug)]
pub(super) struct Slot {
    pub(super) subscription: Subscription,
    state: Mutex<RunState>,
}

impl Slot {
    pub(super) fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            state: Mutex::new(RunState::default()),
        }
    }

    /// Ask for a run. Returns `true` when the caller must start one;
    /// `false` when a run is in progress and the request was queued.
    pub(super) fn request(&self) -> bool {
        let mut state = self.state.lock();
        if state.running {
            state.pending = true;
            false
        } else {
            state.running = true;
            true
        }
    }

    /// Mark a run finished. Returns `true` when a queued request needs
    /// another run.
    pub(super) fn finish(&self) -> bool {
        let mut state = self.state.lock();
        if state.pending {
            state.pending = false;
            true
        } else {
            state.running = false;
            false
        }
    }

    /// Run the cascade until no request is queued. Blocking.
    pub(super) fn run(&self, executor: &Executor) {
        loop {
            self.run_once(executor);
            if !self.finish() {
                break;
            }
        }
    }

    fn run_once(&self, executor: &Executor) {
        let name = &self.subscription.name;
        let started = Instant::now();

        match executor.run_cascade(&self.subscription.cascade) {
            Ok(()) => status_success(&format!(
                "{name} ({} ms)",
                started.elapsed().as_millis()
            )),
            Err(e) => status_error(&format!("{name} failed"), &format!("{e:#}")),
        }
    }
}
