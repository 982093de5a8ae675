//! Aggregate operations.

use super::{Action, Definition, OpKind, OperationId, Target};

/// Kinds that get a `<prefix><all_task_name>` aggregate.
const AGGREGATED: [OpKind; 5] = [
    OpKind::ConcatMacros,
    OpKind::BuildDocs,
    OpKind::WatchMacros,
    OpKind::WatchDocs,
    OpKind::WatchTemplates,
];

/// One aggregate per kind over every per-component operation of that kind,
/// plus the top-level watch over the three watch aggregates.
///
/// Aggregates always exist; with no members they succeed without doing
/// anything.
pub(crate) fn aggregates(definitions: &[Definition]) -> Vec<Definition> {
    let mut out: Vec<Definition> = AGGREGATED
        .iter()
        .map(|&kind| Definition {
            id: OperationId::aggregate(kind),
            description: format!("run every {} operation", kind.label()),
            action: Action::Parallel(
                definitions
                    .iter()
                    .filter(|d| d.id.kind == kind && matches!(d.id.target, Target::Component(_)))
                    .map(|d| d.id.clone())
                    .collect(),
            ),
        })
        .collect();

    out.push(Definition {
        id: OperationId::aggregate(OpKind::Watch),
        description: "watch macros, templates and docs of every component".into(),
        action: Action::Parallel(vec![
            OperationId::aggregate(OpKind::WatchMacros),
            OperationId::aggregate(OpKind::WatchTemplates),
            OperationId::aggregate(OpKind::WatchDocs),
        ]),
    });

    out
}
