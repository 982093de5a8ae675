//! Structured operation identifiers.
//!
//! Operations are keyed by [`OperationId`]; the string name users type is
//! rendered from the configured prefixes only at the edges (CLI, hooks,
//! logs).

use crate::config::TaskPrefixes;
use std::fmt;

/// Suffix of the full-rebuild variant of a build operation.
pub const ALL_DOCS_SUFFIX: &str = ":allDocs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    ConcatMacros,
    BuildDocs,
    WatchMacros,
    WatchDocs,
    WatchTemplates,
    /// Every watch of a component, or all watch aggregates.
    Watch,
}

impl OpKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConcatMacros => "concatenate-macros",
            Self::BuildDocs => "build-docs",
            Self::WatchMacros => "watch-macros",
            Self::WatchDocs => "watch-docs",
            Self::WatchTemplates => "watch-templates",
            Self::Watch => "watch",
        }
    }

    pub fn prefix(self, prefixes: &TaskPrefixes) -> &str {
        match self {
            Self::ConcatMacros => &prefixes.concatenate_macros,
            Self::BuildDocs => &prefixes.build,
            Self::WatchMacros => &prefixes.watch_macros,
            Self::WatchDocs => &prefixes.watch_docs,
            Self::WatchTemplates => &prefixes.watch_templates,
            Self::Watch => &prefixes.watch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// One component.
    Component(String),
    /// Full rebuild of one component's docs (build operations only).
    AllDocs(String),
    /// Aggregate over every component.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId {
    pub kind: OpKind,
    pub target: Target,
}

impl OperationId {
    pub fn component(kind: OpKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            target: Target::Component(name.into()),
        }
    }

    pub fn all_docs(name: impl Into<String>) -> Self {
        Self {
            kind: OpKind::BuildDocs,
            target: Target::AllDocs(name.into()),
        }
    }

    pub fn aggregate(kind: OpKind) -> Self {
        Self {
            kind,
            target: Target::All,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.target == Target::All
    }

    /// User-facing name: `<prefix><component>`, `<prefix><component>:allDocs`
    /// or `<prefix><all_task_name>`.
    pub fn name(&self, prefixes: &TaskPrefixes, all_task_name: &str) -> String {
        let prefix = self.kind.prefix(prefixes);
        match &self.target {
            Target::Component(name) => format!("{prefix}{name}"),
            Target::AllDocs(name) => format!("{prefix}{name}{ALL_DOCS_SUFFIX}"),
            Target::All => format!("{prefix}{all_task_name}"),
        }
    }
}

/// Prefix-independent form for diagnostics: `build-docs(site, all docs)`.
impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.label();
        match &self.target {
            Target::Component(name) => write!(f, "{kind}({name})"),
            Target::AllDocs(name) => write!(f, "{kind}({name}, all docs)"),
            Target::All => write!(f, "{kind}(all)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_with_default_prefixes() {
        let p = TaskPrefixes::default();
        assert_eq!(
            OperationId::component(OpKind::ConcatMacros, "site").name(&p, "all"),
            "markup:concatenate:macros:site"
        );
        assert_eq!(
            OperationId::component(OpKind::BuildDocs, "site").name(&p, "all"),
            "markup:build:site"
        );
        assert_eq!(
            OperationId::all_docs("site").name(&p, "all"),
            "markup:build:site:allDocs"
        );
        assert_eq!(
            OperationId::aggregate(OpKind::WatchDocs).name(&p, "all"),
            "watch:markup:docs:all"
        );
        assert_eq!(
            OperationId::aggregate(OpKind::Watch).name(&p, "everything"),
            "watch:markup:everything"
        );
    }

    #[test]
    fn test_custom_prefix() {
        let p = TaskPrefixes {
            build: "docs:".into(),
            ..TaskPrefixes::default()
        };
        assert_eq!(
            OperationId::component(OpKind::BuildDocs, "x").name(&p, "all"),
            "docs:x"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            OperationId::all_docs("site").to_string(),
            "build-docs(site, all docs)"
        );
        assert_eq!(OperationId::aggregate(OpKind::Watch).to_string(), "watch(all)");
    }
}
