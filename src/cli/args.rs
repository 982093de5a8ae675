//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Component-aware build and watch orchestrator for documentation sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: docsmith.toml)
    #[arg(short = 'C', long, global = true, default_value = "docsmith.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run operations by name, in order; keep watching if any watch was started
    #[command(visible_alias = "r")]
    Run {
        /// Operation names, e.g. `markup:build:all`
        #[arg(value_name = "OPERATION", required = true)]
        operations: Vec<String>,
    },

    /// Concatenate every component's macros, then build every component's docs
    #[command(visible_alias = "b")]
    Build,

    /// Watch macros, templates and docs of every component
    #[command(visible_alias = "w")]
    Watch,

    /// List every operation
    #[command(visible_alias = "l")]
    List,
}
