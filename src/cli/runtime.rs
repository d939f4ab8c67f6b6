use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use selfheal::Config;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::LogFormat;

/// `RUST_LOG` wins; otherwise `level`, forced to DEBUG by `debug`.
pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration came from; `None` when defaults were used
    pub path: Option<PathBuf>,
    searched: Option<PathBuf>,
}

impl LoadedConfig {
    /// Report where the configuration came from. Called once logging is up.
    pub fn log_source(&self) {
        match (&self.path, &self.searched) {
            (Some(path), _) => info!("Loaded configuration from: {}", path.display()),
            (None, Some(searched)) => warn!(
                "Config file not found, using defaults: {}",
                searched.display()
            ),
            (None, None) => warn!("No config directory on this platform, using defaults"),
        }
    }
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let (candidate, explicit) = match config_path {
        Some(path) => (Some(path.clone()), true),
        None => (Config::default_path(), false),
    };

    let mut loaded = match candidate {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = Config::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            LoadedConfig {
                config,
                path: Some(path),
                searched: None,
            }
        }
        Some(path) if explicit => bail!("Config file not found: {}", path.display()),
        searched => LoadedConfig {
            config: Config::default(),
            path: None,
            searched,
        },
    };

    loaded
        .config
        .apply_env_overrides()
        .context("Invalid SELFHEAL_* environment override")?;
    Ok(loaded)
}
