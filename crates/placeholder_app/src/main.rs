mod app;
mod cli;
mod config;
mod effects;
mod render;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;
use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(cli.log.into(), level, None);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    config.apply_cli(&cli);

    app::run(&cli, config)
}
