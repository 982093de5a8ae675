//! The two kinds of work an operation can do: concatenate a component's
//! macros into one importable file, and render its documentation.

mod build;
mod concat;

pub use build::{BuildEnv, BuildReport, build_docs};
pub use concat::{ConcatOutcome, MACRO_HEADER, concatenate_macros};
