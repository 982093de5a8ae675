//! Config field path used in diagnostics.

use owo_colors::OwoColorize;
use std::borrow::Cow;
use std::fmt;

/// Path of a config field, e.g. `components[1].referenced_by`.
///
/// Static paths cover top-level keys; component entries are addressed by
/// index because names may themselves be the thing that is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// Field of the component at `index` in `[[components]]`.
    pub fn component(index: usize, field: &str) -> Self {
        Self(Cow::Owned(format!("components[{index}].{field}")))
    }

    /// Key of a `[hooks."<operation>"]` table.
    pub fn hook(operation: &str) -> Self {
        Self(Cow::Owned(format!("hooks.\"{operation}\"")))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_path() {
        let path = FieldPath::component(2, "docs.sources");
        assert_eq!(path.as_str(), "components[2].docs.sources");
    }

    #[test]
    fn test_hook_path() {
        let path = FieldPath::hook("markup:build:all");
        assert_eq!(path.as_str(), "hooks.\"markup:build:all\"");
    }
}
