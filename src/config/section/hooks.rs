//! Operation lifecycle hooks configuration.
//!
//! Hooks are keyed by the exact operation name they wrap.
//!
//! # Example
//!
//! ```toml
//! [hooks."markup:build:all"]
//! pre = [{ command = ["./scripts/fetch-tokens.sh"] }]
//!
//! [[hooks."markup:build:all".post]]
//! command = ["pagefind", "--site", "$DOCSMITH_ROOT/_site"]
//! quiet = false
//! ```

use serde::{Deserialize, Serialize};

/// Pre and post hooks for one operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationHooks {
    /// Run before the operation, in order. A failure aborts the operation.
    pub pre: Vec<HookConfig>,
    /// Run after the operation succeeded, in order.
    pub post: Vec<HookConfig>,
}

impl OperationHooks {
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

/// Configuration for a single hook command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Whether this hook is enabled (default: true).
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Display name for logging (defaults to command[0]).
    pub name: Option<String>,

    /// Command and arguments to execute.
    /// Supports `$DOCSMITH_*` variable substitution.
    pub command: Vec<String>,

    /// Suppress output (default: true).
    #[serde(default = "default_quiet")]
    pub quiet: bool,
}

fn default_quiet() -> bool {
    true
}

fn default_enable() -> bool {
    true
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            enable: true,
            name: None,
            command: Vec::new(),
            quiet: true,
        }
    }
}

impl HookConfig {
    /// Get the display name for this hook.
    ///
    /// Returns `name` if set, otherwise falls back to `command[0]`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.command.first().map(String::as_str).unwrap_or("hook"))
    }
}
