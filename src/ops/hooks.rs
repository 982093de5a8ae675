//! Hook attachment.

use super::Operation;
use crate::config::{ConfigDiagnostics, FieldPath, OperationHooks};
use std::collections::BTreeMap;

/// Give every operation the hooks configured under its exact name.
///
/// Hook keys naming no operation are reported as warnings.
pub(crate) fn attach(
    ops: &mut [Operation],
    hooks: &BTreeMap<String, OperationHooks>,
    diag: &mut ConfigDiagnostics,
) {
    for op in ops.iter_mut() {
        if let Some(configured) = hooks.get(&op.name) {
            op.hooks = configured.clone();
        }
    }

    for key in hooks.keys() {
        if !ops.iter().any(|op| &op.name == key) {
            diag.warn(FieldPath::hook(key), "no operation has this name, hooks ignored");
        }
    }
}
