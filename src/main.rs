//! docsmith - component-aware build and watch orchestrator for documentation sites.

#![allow(dead_code)]

mod cli;
mod config;
mod data;
mod freshness;
mod hooks;
mod logger;
mod ops;
mod registry;
mod render;
mod source;
mod tasks;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;
use ops::{Executor, OpKind, OperationId, OperationSet};
use registry::Registry;
use std::sync::Arc;
use watch::WatchHub;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = ProjectConfig::load(&cli)?;
    let registry = Registry::new(&config)?;
    let ops = OperationSet::derive(&config, &registry)?;

    let aggregate = |kind| OperationId::aggregate(kind).name(&config.prefixes, &config.all_task_name);
    let names = match &cli.command {
        Commands::Run { operations } => operations.clone(),
        Commands::Build => vec![aggregate(OpKind::ConcatMacros), aggregate(OpKind::BuildDocs)],
        Commands::Watch => vec![aggregate(OpKind::Watch)],
        Commands::List => {
            cli::list::list_operations(&ops);
            return Ok(());
        }
    };

    let executor = Arc::new(Executor::new(config, registry, ops));
    executor.run_named(&names)?;

    let subscriptions = executor.take_subscriptions();
    if subscriptions.is_empty() {
        return Ok(());
    }
    WatchHub::new(subscriptions).run(executor)
}
