use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::commands::Commands;
use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let loaded = load_config(cli.config.as_ref()).await?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded.config.log_level.clone());
    init_logging(&level, cli.debug, cli.log_format)?;
    loaded.log_source();

    info!("Starting selfheal v{}", env!("CARGO_PKG_VERSION"));

    let LoadedConfig { config, path, .. } = loaded;
    if !matches!(cli.command, Commands::Config(_)) {
        config.validate()?;
    }
    let cli_context = CliContext::new(config, path, cli.output);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
