//! Per-component operation derivation.
//!
//! | attribute            | operations                                       |
//! |----------------------|--------------------------------------------------|
//! | macros               | concatenate-macros, watch-macros                 |
//! | docs                 | build (incremental), build `:allDocs`, watch-docs|
//! | templates (+ docs)   | watch-templates                                  |
//! | any watch            | watch (all of the component's watches)           |

use super::{Action, BuildMode, Cascade, Definition, OpKind, OperationId, WatchSpec};
use crate::registry::Component;

pub(crate) fn component_operations(component: &Component) -> Vec<Definition> {
    let name = component.name.as_str();
    let mut defs = Vec::new();
    let mut watches = Vec::new();

    if let Some(macros) = &component.macros {
        defs.push(Definition {
            id: OperationId::component(OpKind::ConcatMacros, name),
            description: format!("concatenate the macros of `{name}`"),
            action: Action::ConcatMacros {
                component: name.to_string(),
            },
        });

        let id = OperationId::component(OpKind::WatchMacros, name);
        watches.push(id.clone());
        defs.push(Definition {
            id,
            description: format!("watch the macros of `{name}`, rebuild every consumer"),
            action: Action::Watch(WatchSpec {
                sources: macros.sources.clone(),
                cascade: macro_cascade(component),
            }),
        });
    }

    if let Some(docs) = &component.docs {
        defs.push(Definition {
            id: OperationId::component(OpKind::BuildDocs, name),
            description: format!("render the changed docs of `{name}`"),
            action: Action::BuildDocs {
                component: name.to_string(),
                mode: BuildMode::Incremental,
            },
        });
        defs.push(Definition {
            id: OperationId::all_docs(name),
            description: format!("render every doc of `{name}`"),
            action: Action::BuildDocs {
                component: name.to_string(),
                mode: BuildMode::All,
            },
        });

        let id = OperationId::component(OpKind::WatchDocs, name);
        watches.push(id.clone());
        defs.push(Definition {
            id,
            description: format!("watch the docs of `{name}`, render what changed"),
            action: Action::Watch(WatchSpec {
                sources: docs.watch.clone(),
                cascade: Cascade::new()
                    .then(vec![OperationId::component(OpKind::BuildDocs, name)]),
            }),
        });

        if let Some(templates) = &component.templates {
            let id = OperationId::component(OpKind::WatchTemplates, name);
            watches.push(id.clone());
            defs.push(Definition {
                id,
                description: format!("watch the templates of `{name}`, render every doc"),
                action: Action::Watch(WatchSpec {
                    sources: templates.clone(),
                    cascade: Cascade::new().then(vec![OperationId::all_docs(name)]),
                }),
            });
        }
    }

    if !watches.is_empty() {
        defs.push(Definition {
            id: OperationId::component(OpKind::Watch, name),
            description: format!("run every watch of `{name}`"),
            action: Action::Parallel(watches),
        });
    }

    defs
}

/// Concatenate, then fully rebuild the component's own docs and the docs of
/// every component that references its macros. Never incremental: a macro
/// change can affect any doc.
fn macro_cascade(component: &Component) -> Cascade {
    let name = component.name.as_str();

    let mut rebuilds = Vec::new();
    if component.has_docs() {
        rebuilds.push(OperationId::all_docs(name));
    }
    rebuilds.extend(component.referenced_by.iter().map(OperationId::all_docs));

    Cascade::new()
        .then(vec![OperationId::component(OpKind::ConcatMacros, name)])
        .then(rebuilds)
}
