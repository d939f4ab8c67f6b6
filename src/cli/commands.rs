use clap::Subcommand;

use super::capture::CaptureArgs;
use super::config::ConfigArgs;
use super::derive::DeriveArgs;
use super::heal::HealArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Capture a locator on one HTML snapshot and heal it against another
    Heal(HealArgs),

    /// List the looser CSS variants tried for a locator
    Derive(DeriveArgs),

    /// Show the recovery bundle captured for a locator
    Capture(CaptureArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print heal metrics in prometheus text format
    Metrics,

    /// Show build information
    Version,
}
