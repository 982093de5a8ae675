//! `docsmith list`.

use crate::ops::OperationSet;
use owo_colors::OwoColorize;

/// Print every operation, aligned, per-component operations first.
pub fn list_operations(ops: &OperationSet) {
    let mut rows: Vec<_> = ops.iter().collect();
    rows.sort_by(|a, b| {
        a.id.is_aggregate()
            .cmp(&b.id.is_aggregate())
            .then_with(|| a.name.cmp(&b.name))
    });

    let width = rows.iter().map(|op| op.name.len()).max().unwrap_or(0);
    for op in rows {
        let hooks = if op.hooks.is_empty() { "" } else { " [hooks]" };
        println!(
            "{:<width$}  {}{}",
            op.name.cyan(),
            op.description.dimmed(),
            hooks.yellow()
        );
    }
}
