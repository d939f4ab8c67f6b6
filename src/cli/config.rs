use crate::cli::context::CliContext;
use anyhow::Result;
use clap::{Args, Subcommand};

use super::output::print_structured;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration
    Validate,
}

pub fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    match args.action {
        ConfigAction::Show => {
            if print_structured(ctx.output(), config)? {
                return Ok(());
            }
            match ctx.config_path() {
                Some(path) => println!("Current configuration ({}):", path.display()),
                None => println!("Current configuration (defaults):"),
            }
            print!("{}", config.to_yaml()?);
        }
        ConfigAction::Validate => {
            config.validate()?;
            println!("Configuration is valid");
        }
    }
    Ok(())
}
