//! Hook execution utilities.
//!
//! Provides environment variable building and command execution for
//! operation hooks.

use crate::config::HookConfig;
use crate::log;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// When a hook runs relative to its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Pre,
    Post,
}

impl HookPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("{phase} hook `{name}` of `{operation}` could not start")]
    Spawn {
        phase: HookPhase,
        name: String,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} hook `{name}` of `{operation}` failed with {status}{}", detail_suffix(.stderr))]
    Failed {
        phase: HookPhase,
        name: String,
        operation: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn detail_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$DOCSMITH_*` environment variables for hook execution
pub fn build_vars(root: &Path, operation: &str, phase: HookPhase) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert("DOCSMITH_ROOT".into(), root.display().to_string());
    vars.insert("DOCSMITH_OPERATION".into(), operation.into());
    vars.insert("DOCSMITH_PHASE".into(), phase.as_str().into());
    vars
}

// ============================================================================
// Command Argument Resolution
// ============================================================================

/// Resolve `$DOCSMITH_*` variables in command arguments
///
/// Replaces occurrences of `$DOCSMITH_XXX` with actual values from the vars map
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                let pattern = format!("${}", key);
                result = result.replace(&pattern, value);
            }
            result
        })
        .collect()
}

// ============================================================================
// Hook Execution
// ============================================================================

/// Execute a single hook in `root`.
///
/// Disabled hooks and hooks without a command are skipped.
pub fn run_hook(
    hook: &HookConfig,
    root: &Path,
    operation: &str,
    phase: HookPhase,
) -> Result<(), HookError> {
    if !hook.enable || hook.command.is_empty() {
        return Ok(());
    }

    let vars = build_vars(root, operation, phase);
    let resolved = resolve_args(&hook.command, &vars);
    let name = hook.display_name().to_string();

    if !hook.quiet {
        log!(phase.as_str(); "`{}` running", name);
    }

    let output = Command::new(&resolved[0])
        .args(&resolved[1..])
        .current_dir(root)
        .envs(&vars)
        .output()
        .map_err(|source| HookError::Spawn {
            phase,
            name: name.clone(),
            operation: operation.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(HookError::Failed {
            phase,
            name,
            operation: operation.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    // Print output directly without prefix (unless quiet)
    if !hook.quiet {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            println!("{stdout}");
        }
    }

    Ok(())
}

/// Execute hooks in order, stopping at the first failure.
pub fn run_hooks(
    hooks: &[HookConfig],
    root: &Path,
    operation: &str,
    phase: HookPhase,
) -> Result<(), HookError> {
    for hook in hooks {
        run_hook(hook, root, operation, phase)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
