//! Macro concatenation.

use crate::registry::MacroSources;
use crate::utils::write::write_if_changed;
use anyhow::{Context, Result};

/// First line of every generated macro file.
pub const MACRO_HEADER: &str =
    "{# DO NOT EDIT: This file is automatically generated by the project's build task #}\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatOutcome {
    /// `concatenate_component_macros = false`.
    Disabled,
    /// No source file matched, nothing written.
    NoInputs,
    /// The generated file already had this content.
    Unchanged { inputs: usize },
    Written { inputs: usize },
}

/// Join every macro source (in path order) into the component's generated file.
pub fn concatenate_macros(macros: &MacroSources, enabled: bool) -> Result<ConcatOutcome> {
    if !enabled {
        return Ok(ConcatOutcome::Disabled);
    }

    let files = macros.sources.files();
    if files.is_empty() {
        return Ok(ConcatOutcome::NoInputs);
    }

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        let content = std::fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read macro source `{}`", file.path.display()))?;
        parts.push(content);
    }

    let content = format!("{MACRO_HEADER}{}", parts.join("\n"));
    let written = write_if_changed(&macros.output_file, content.as_bytes())
        .with_context(|| format!("failed to write `{}`", macros.output_file.display()))?;

    let inputs = files.len();
    Ok(if written {
        ConcatOutcome::Written { inputs }
    } else {
        ConcatOutcome::Unchanged { inputs }
    })
}
