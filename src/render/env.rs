//! Render environment customization.
//!
//! Customizers run in order on the same `Tera` instance: the project's
//! first, then each dependency module's. A later customizer can override a
//! filter or function registered by an earlier one.

use crate::config::EnvConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Tera, Value};

/// Something that registers filters, functions or testers on an environment.
pub trait EnvCustomizer: Send + Sync {
    fn customize(&self, tera: &mut Tera);
}

impl<F> EnvCustomizer for F
where
    F: Fn(&mut Tera) + Send + Sync,
{
    fn customize(&self, tera: &mut Tera) {
        self(tera)
    }
}

pub type SharedCustomizer = Arc<dyn EnvCustomizer>;

/// `[env.globals]`: each entry becomes a zero-argument function.
///
/// `site_name = "Docs"` is used as `{{ site_name() }}`.
#[derive(Debug, Clone, Default)]
pub struct DeclaredGlobals {
    globals: Vec<(String, Value)>,
}

impl DeclaredGlobals {
    pub fn new(env: &EnvConfig) -> Self {
        Self {
            globals: env
                .globals
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl EnvCustomizer for DeclaredGlobals {
    fn customize(&self, tera: &mut Tera) {
        for (name, value) in &self.globals {
            let value = value.clone();
            tera.register_function(
                name,
                move |_: &HashMap<String, Value>| -> tera::Result<Value> { Ok(value.clone()) },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_declared_globals_registered() {
        let env = EnvConfig {
            globals: BTreeMap::from([
                ("site_name".to_string(), json!("Docs")),
                ("versions".to_string(), json!(["1.0", "2.0"])),
            ]),
        };

        let mut tera = Tera::default();
        DeclaredGlobals::new(&env).customize(&mut tera);

        let out = tera
            .render_str(
                "{{ site_name() }} {{ versions() | length }}",
                &tera::Context::new(),
            )
            .unwrap();
        assert_eq!(out, "Docs 2");
    }

    #[test]
    fn test_later_customizer_overrides() {
        let first = |tera: &mut Tera| {
            tera.register_function("brand", |_: &HashMap<String, Value>| -> tera::Result<Value> {
                Ok(json!("project"))
            });
        };
        let second = |tera: &mut Tera| {
            tera.register_function("brand", |_: &HashMap<String, Value>| -> tera::Result<Value> {
                Ok(json!("module"))
            });
        };

        let customizers: Vec<SharedCustomizer> = vec![Arc::new(first), Arc::new(second)];
        let mut tera = Tera::default();
        for c in &customizers {
            c.customize(&mut tera);
        }

        let out = tera.render_str("{{ brand() }}", &tera::Context::new()).unwrap();
        assert_eq!(out, "module");
    }
}
