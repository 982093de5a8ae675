//! Watch mode.
//!
//! Watch operations do not block when run: they arm a [`Subscription`].
//! Once the requested operations have finished, a single [`WatchHub`]
//! serves every armed subscription.
//!
//! ```text
//! notify ─► std mpsc ─► bridge thread ─► tokio mpsc ─► Debouncer
//!                                                         │ batch
//!                                         matching subscriptions
//!                                                         │
//!                                       spawn_blocking(run cascade)
//! ```
//!
//! Runs of one subscription never overlap: a change that arrives during a
//! run queues exactly one more run. Different subscriptions run
//! independently.

mod debouncer;
mod dispatch;
mod types;
mod watch_roots;

pub use dispatch::Subscription;
pub use types::{ChangeKind, ChangeSet};

use crate::ops::Executor;
use crate::{debug, log};
use anyhow::{Context, Result};
use debouncer::Debouncer;
use dispatch::Slot;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use watch_roots::WatchRoots;

/// How often missing watch roots are checked for.
const ROOT_CHECK_INTERVAL: Duration = Duration::from_secs(2);

pub struct WatchHub {
    slots: Vec<Arc<Slot>>,
}

impl WatchHub {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self {
            slots: subscriptions
                .into_iter()
                .map(|s| Arc::new(Slot::new(s)))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the subscriptions a batch of paths would fire.
    pub fn matching<'a>(&'a self, paths: &'a [PathBuf]) -> Vec<&'a str> {
        self.matching_slots(paths)
            .map(|slot| slot.subscription.name.as_str())
            .collect()
    }

    fn matching_slots<'a>(&'a self, paths: &'a [PathBuf]) -> impl Iterator<Item = &'a Arc<Slot>> {
        self.slots
            .iter()
            .filter(move |slot| slot.subscription.matches_any(paths))
    }

    fn roots(&self) -> WatchRoots {
        WatchRoots::new(
            self.slots
                .iter()
                .flat_map(|slot| slot.subscription.sources.watch_roots()),
        )
    }

    /// Serve subscriptions until the process is interrupted.
    pub fn run(self, executor: Arc<Executor>) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start the watch runtime")?;
        runtime.block_on(self.event_loop(executor))
    }

    async fn event_loop(self, executor: Arc<Executor>) -> Result<()> {
        // notify has no async API
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;

        let mut roots = self.roots();
        roots
            .attach_existing(&mut watcher)
            .context("failed to watch source directories")?;

        for root in roots.desired() {
            debug!("watch"; "root: {}", root.display());
        }
        log!(
            "watch";
            "watching {} operation(s), press Ctrl+C to stop",
            self.slots.len()
        );

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut debouncer = Debouncer::new();
        let mut root_check = tokio::time::interval(ROOT_CHECK_INTERVAL);

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if let Some(changes) = debouncer.take_if_ready() {
                        self.dispatch(ChangeSet::from_map(changes), &executor);
                    }
                }
                _ = root_check.tick() => roots.maintain(&mut watcher),
            }
        }

        Ok(())
    }

    fn dispatch(&self, changes: ChangeSet, executor: &Arc<Executor>) {
        let paths = changes.paths();
        let mut fired = 0;

        for slot in self.matching_slots(&paths) {
            fired += 1;
            if !slot.request() {
                debug!("watch"; "{} busy, queued", slot.subscription.name);
                continue;
            }

            let slot = Arc::clone(slot);
            let executor = Arc::clone(executor);
            tokio::task::spawn_blocking(move || slot.run(&executor));
        }

        if fired == 0 {
            debug!("watch"; "{} change(s) matched no subscription", changes.len());
        }
    }
}
