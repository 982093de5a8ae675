//! Operation execution.
//!
//! Every operation runs as pre-hooks → action → post-hooks, whether it was
//! requested on the command line, is a member of an aggregate, or fires
//! from a watch cascade.

use super::{Action, BuildMode, Cascade, Operation, OperationId, OperationSet, WatchSpec};
use crate::config::ProjectConfig;
use crate::freshness::LastRun;
use crate::hooks::{HookPhase, run_hooks};
use crate::registry::Registry;
use crate::render::{EnvCustomizer, SharedCustomizer};
use crate::tasks::{BuildEnv, ConcatOutcome, build_docs, concatenate_macros};
use crate::watch::Subscription;
use crate::{debug, log};
use anyhow::{Result, anyhow, bail};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::SystemTime;

pub struct Executor {
    config: ProjectConfig,
    registry: Registry,
    ops: OperationSet,
    customizers: Vec<SharedCustomizer>,
    last_run: LastRun<OperationId>,
    armed: Mutex<Vec<Subscription>>,
}

impl Executor {
    pub fn new(config: ProjectConfig, registry: Registry, ops: OperationSet) -> Self {
        Self {
            config,
            registry,
            ops,
            customizers: Vec::new(),
            last_run: LastRun::new(),
            armed: Mutex::new(Vec::new()),
        }
    }

    /// Register a programmatic render environment customizer.
    ///
    /// Applied after `[env.globals]` and before dependency modules.
    pub fn with_customizer(mut self, customizer: impl EnvCustomizer + 'static) -> Self {
        self.customizers.push(Arc::new(customizer));
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn operations(&self) -> &OperationSet {
        &self.ops
    }

    /// Run operations by name, in order, stopping at the first failure.
    ///
    /// Every name is resolved first: if any is unknown nothing runs.
    pub fn run_named<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let mut ids = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            match self.ops.resolve(name.as_ref()) {
                Some(op) => ids.push(op.id.clone()),
                None => unknown.push(name.as_ref().to_string()),
            }
        }

        if !unknown.is_empty() {
            bail!(
                "unknown operation(s): {}\nrun `docsmith list` to see every operation",
                unknown.join(", ")
            );
        }

        for id in &ids {
            self.run(id)?;
        }
        Ok(())
    }

    /// Run one operation with its hooks.
    pub fn run(&self, id: &OperationId) -> Result<()> {
        let op = self
            .ops
            .get(id)
            .ok_or_else(|| anyhow!("no operation {id}"))?;
        let root = self.config.get_root();

        debug!("run"; "{}", op.name);
        run_hooks(&op.hooks.pre, root, &op.name, HookPhase::Pre)?;
        self.perform(op)?;
        run_hooks(&op.hooks.post, root, &op.name, HookPhase::Post)?;
        Ok(())
    }

    /// Run a cascade stage by stage.
    ///
    /// A failing stage stops the cascade.
    pub fn run_cascade(&self, cascade: &Cascade) -> Result<()> {
        for stage in &cascade.stages {
            self.run_parallel(stage)?;
        }
        Ok(())
    }

    /// Subscriptions armed so far, leaving none behind.
    pub fn take_subscriptions(&self) -> Vec<Subscription> {
        std::mem::take(&mut *self.armed.lock())
    }

    fn perform(&self, op: &Operation) -> Result<()> {
        match &op.action {
            Action::ConcatMacros { component } => self.concat(op, component),
            Action::BuildDocs { component, mode } => self.build(op, component, *mode),
            Action::Watch(spec) => {
                self.arm(op, spec);
                Ok(())
            }
            Action::Parallel(members) => self.run_parallel(members),
        }
    }

    /// Run every member, even when some fail, then report all failures.
    fn run_parallel(&self, members: &[OperationId]) -> Result<()> {
        if let [only] = members {
            return self.run(only);
        }

        let failures: Vec<(String, anyhow::Error)> = members
            .par_iter()
            .filter_map(|id| {
                self.run(id).err().map(|e| {
                    let name = self
                        .ops
                        .get(id)
                        .map_or_else(|| id.to_string(), |op| op.name.clone());
                    (name, e)
                })
            })
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        let details: Vec<String> = failures
            .iter()
            .map(|(name, e)| format!("  {name}: {e:#}"))
            .collect();
        bail!(
            "{} of {} operations failed\n{}",
            failures.len(),
            members.len(),
            details.join("\n")
        )
    }

    fn concat(&self, op: &Operation, component: &str) -> Result<()> {
        let macros = self
            .registry
            .get(component)
            .and_then(|c| c.macros.as_ref())
            .ok_or_else(|| anyhow!("component `{component}` has no macros"))?;

        match concatenate_macros(macros, self.config.concatenate_component_macros)? {
            ConcatOutcome::Written { inputs } => log!(
                "concat";
                "{}: {} file(s) -> {}",
                op.name,
                inputs,
                self.config.root_relative(&macros.output_file).display()
            ),
            ConcatOutcome::Unchanged { .. } => debug!("concat"; "{}: unchanged", op.name),
            ConcatOutcome::NoInputs => debug!("concat"; "{}: no macro sources", op.name),
            ConcatOutcome::Disabled => debug!("concat"; "{}: disabled", op.name),
        }
        Ok(())
    }

    fn build(&self, op: &Operation, component: &str, mode: BuildMode) -> Result<()> {
        let component = self
            .registry
            .get(component)
            .ok_or_else(|| anyhow!("unknown component `{component}`"))?;

        let since = match mode {
            BuildMode::Incremental => self.last_run.get(&op.id),
            BuildMode::All => None,
        };
        let started = SystemTime::now();

        let env = BuildEnv {
            config: &self.config,
            customizers: &self.customizers,
        };
        let report = build_docs(component, since, &env)?;

        // A failed document must be retried by the next incremental run
        if mode == BuildMode::Incremental && report.is_clean() {
            self.last_run.record(op.id.clone(), started);
        }

        if report.rendered() > 0 || !report.is_clean() {
            log!(
                "build";
                "{}: {} rendered, {} written, {} skipped, {} failed",
                op.name,
                report.rendered(),
                report.written,
                report.skipped,
                report.failed.len()
            );
        } else {
            debug!("build"; "{}: up to date", op.name);
        }
        Ok(())
    }

    fn arm(&self, op: &Operation, spec: &WatchSpec) {
        let mut armed = self.armed.lock();
        if armed.iter().any(|s| s.id == op.id) {
            return;
        }
        debug!("watch"; "armed {}", op.name);
        armed.push(Subscription {
            id: op.id.clone(),
            name: op.name.clone(),
            sources: spec.sources.clone(),
            cascade: spec.cascade.clone(),
        });
    }
}
