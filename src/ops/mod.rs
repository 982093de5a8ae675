//! Operations: what can be run by name.
//!
//! # Module Structure
//!
//! ```text
//! ops/
//! ├── id.rs        # OperationId, OpKind, Target, name rendering
//! ├── derive.rs    # per-component operations and watch cascades
//! ├── compose.rs   # `<prefix><all>` aggregates and the top-level watch
//! ├── hooks.rs     # attach [hooks."<name>"] to operations
//! └── executor.rs  # run operations, arm watch subscriptions
//! ```
//!
//! [`OperationSet::derive`] builds the full set once at startup and rejects
//! name collisions and references to operations that do not exist.

mod compose;
mod derive;
mod executor;
mod hooks;
mod id;

pub use executor::Executor;
pub use id::{ALL_DOCS_SUFFIX, OpKind, OperationId, Target};

use crate::config::{ConfigDiagnostics, ConfigError, FieldPath, OperationHooks, ProjectConfig};
use crate::registry::Registry;
use crate::source::SourceSet;
use anyhow::Result;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Only docs modified since the operation's previous successful run.
    Incremental,
    All,
}

/// Ordered stages of operations.
///
/// A stage finishes before the next starts; members of one stage run
/// concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    pub stages: Vec<Vec<OperationId>>,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. Empty stages are dropped.
    pub fn then(mut self, stage: Vec<OperationId>) -> Self {
        if !stage.is_empty() {
            self.stages.push(stage);
        }
        self
    }

    pub fn members(&self) -> impl Iterator<Item = &OperationId> {
        self.stages.iter().flatten()
    }
}

/// Files to watch and what to run when one of them changes.
#[derive(Debug, Clone)]
pub struct WatchSpec {
    pub sources: SourceSet,
    pub cascade: Cascade,
}

#[derive(Debug, Clone)]
pub enum Action {
    ConcatMacros { component: String },
    BuildDocs { component: String, mode: BuildMode },
    Watch(WatchSpec),
    /// Run every member concurrently.
    Parallel(Vec<OperationId>),
}

impl Action {
    /// Operations this action invokes.
    fn references(&self) -> Vec<&OperationId> {
        match self {
            Self::Parallel(members) => members.iter().collect(),
            Self::Watch(spec) => spec.cascade.members().collect(),
            Self::ConcatMacros { .. } | Self::BuildDocs { .. } => Vec::new(),
        }
    }
}

/// An operation before it has a name and hooks.
#[derive(Debug, Clone)]
pub(crate) struct Definition {
    pub id: OperationId,
    pub description: String,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OperationId,
    pub name: String,
    pub description: String,
    pub action: Action,
    pub hooks: OperationHooks,
}

/// Every runnable operation of a project.
#[derive(Debug, Default)]
pub struct OperationSet {
    ops: Vec<Operation>,
    by_id: FxHashMap<OperationId, usize>,
    by_name: FxHashMap<String, usize>,
}

impl OperationSet {
    /// Derive, compose, name and hook every operation, then validate the set.
    pub fn derive(config: &ProjectConfig, registry: &Registry) -> Result<Self> {
        let mut definitions: Vec<Definition> = registry
            .components()
            .iter()
            .flat_map(derive::component_operations)
            .collect();
        let aggregates = compose::aggregates(&definitions);
        definitions.extend(aggregates);

        let mut diag = ConfigDiagnostics::new();
        let mut set = Self::default();

        for definition in definitions {
            let name = definition.id.name(&config.prefixes, &config.all_task_name);
            if let Some(&existing) = set.by_name.get(&name) {
                diag.error_with_hint(
                    FieldPath::new("components"),
                    format!(
                        "operation name `{name}` is produced by both {} and {}",
                        set.ops[existing].id, definition.id
                    ),
                    "rename the component or change [prefixes] / all_task_name",
                );
                continue;
            }

            let index = set.ops.len();
            set.by_id.insert(definition.id.clone(), index);
            set.by_name.insert(name.clone(), index);
            set.ops.push(Operation {
                id: definition.id,
                name,
                description: definition.description,
                action: definition.action,
                hooks: OperationHooks::default(),
            });
        }

        set.check_references(&mut diag);
        hooks::attach(&mut set.ops, &config.hooks, &mut diag);

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Invalid)?;
        Ok(set)
    }

    fn check_references(&self, diag: &mut ConfigDiagnostics) {
        for op in &self.ops {
            for reference in op.action.references() {
                if !self.by_id.contains_key(reference) {
                    diag.error(
                        FieldPath::new("components"),
                        format!("`{}` refers to missing operation {reference}", op.name),
                    );
                }
            }
        }
    }

    pub fn get(&self, id: &OperationId) -> Option<&Operation> {
        self.by_id.get(id).map(|&i| &self.ops[i])
    }

    /// Look up an operation by its user-facing name.
    pub fn resolve(&self, name: &str) -> Option<&Operation> {
        self.by_name.get(name).map(|&i| &self.ops[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.ops.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.ops.iter().map(|op| op.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
