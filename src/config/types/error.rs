//! Errors raised while loading `docsmith.toml`.
//!
//! Validation never stops at the first problem: checks push into a
//! [`ConfigDiagnostics`], which is turned into [`ConfigError::Invalid`]
//! only once every section has been looked at.

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML")]
    Toml(#[from] toml::de::Error),

    #[error("no config file at `{0}`")]
    NotFound(PathBuf),

    /// Printed as-is; the list already carries every detail.
    #[error("{0}")]
    Invalid(ConfigDiagnostics),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged, loading goes on.
    Warning,
    /// Fails the load.
    Error,
}

/// One problem at one config field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    /// e.g. `components[0].referenced_by`
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.as_str().cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n    {} {hint}", "hint:".yellow())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    entries: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, field: FieldPath, message: String, hint: Option<String>) {
        self.entries.push(ConfigDiagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.by_severity(Severity::Warning)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn print_warnings(&self) {
        for warning in self.warnings() {
            crate::log!("warning"; "{}", warning);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// `Err(self)` when at least one error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.errors().count();
        let noun = if count == 1 { "error" } else { "errors" };
        write!(f, "{}", format!("invalid config ({count} {noun}):").red().bold())?;
        for error in self.errors() {
            write!(f, "\n  {} {error}", "-".red())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_io_error_names_the_file() {
        let err = ConfigError::Io(
            PathBuf::from("docsmith.toml"),
            std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read `docsmith.toml`");
    }

    #[test]
    fn test_warnings_alone_are_ok() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("hooks"), "unused hook");
        assert!(!diag.has_errors());
        assert_eq!(diag.warnings().count(), 1);
        assert!(diag.into_result().is_ok());
    }

    #[test]
    fn test_errors_listed_with_hints() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("hooks"), "unused hook");
        diag.error(FieldPath::component(0, "name"), "must not be empty");
        diag.error_with_hint(
            FieldPath::component(1, "referenced_by"),
            "unknown component `nope`",
            "declare it under [[components]]",
        );

        let err = diag.into_result().unwrap_err();
        assert_eq!(err.errors().count(), 2);
        let display = err.to_string();
        assert!(display.contains("invalid config (2 errors):"));
        assert!(display.contains("must not be empty"));
        assert!(display.contains("components[1].referenced_by"));
        assert!(display.contains("declare it under [[components]]"));
        assert!(!display.contains("unused hook"));
    }
}
