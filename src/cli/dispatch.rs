use super::capture::cmd_capture;
use super::config::cmd_config;
use super::derive::cmd_derive;
use super::env::CliArgs;
use super::heal::cmd_heal;
use super::info::cmd_version;
use super::metrics::cmd_metrics;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Heal(args) => cmd_heal(args, ctx).await,
        Commands::Derive(args) => cmd_derive(args, ctx),
        Commands::Capture(args) => cmd_capture(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx),
        Commands::Metrics => cmd_metrics(),
        Commands::Version => cmd_version(ctx),
    }
}
