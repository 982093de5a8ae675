//! Configuration section definitions.
//!
//! | Module      | TOML Section       | Purpose                               |
//! |-------------|--------------------|---------------------------------------|
//! | `component` | `[[components]]`   | Component registry entries            |
//! | `env`       | `[env]`, `[[dependencies]]` | Render env, dependency modules |
//! | `hooks`     | `[hooks."<op>"]`   | Pre/post hooks per operation name     |
//! | `prefix`    | `[prefixes]`       | Operation name prefixes               |

mod component;
mod env;
mod hooks;
mod prefix;

pub use component::{ComponentConfig, DocSourcesConfig, MacroSourcesConfig, TemplateSourcesConfig};
pub use env::{DEPENDENCY_MANIFEST, DependencyConfig, EnvConfig};
pub use hooks::{HookConfig, OperationHooks};
pub use prefix::TaskPrefixes;
