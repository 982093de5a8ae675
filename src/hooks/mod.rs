//! Lifecycle hooks.
//!
//! External commands bound to an operation name, run before (`pre`) or
//! after (`post`) the operation itself.

mod runner;

pub use runner::{HookError, HookPhase, build_vars, resolve_args, run_hook, run_hooks};
