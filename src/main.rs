//! assetflow - a front-end asset pipeline with live reload.

mod actor;
mod asset;
mod cache;
mod cli;
mod config;
mod core;
mod embed;
mod image;
mod logger;
mod reload;
mod task;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build};
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;
    let mode = cli.command.mode();

    match &cli.command {
        Commands::Build(_) => build::build(&config, mode),
        Commands::Develop { .. } => build::develop(config, mode),
        Commands::Clean => build::clean_only(&config),
        command => command
            .task()
            .map_or(Ok(()), |task| build::run_single(&config, mode, task)),
    }
}
