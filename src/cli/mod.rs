//! Command-line interface module.

mod args;
pub mod list;

pub use args::{Cli, Commands};
