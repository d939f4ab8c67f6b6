pub mod app;
pub mod capture;
pub mod commands;
pub mod config;
pub mod context;
pub mod derive;
pub mod dispatch;
pub mod env;
pub mod heal;
pub mod info;
pub mod metrics;
pub mod output;
pub mod runtime;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

pub async fn read_html(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {}", path.display()))
}

/// `WIDTHxHEIGHT`
pub fn parse_viewport(raw: &str) -> std::result::Result<(u32, u32), String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", raw))?;
    let width: u32 = width.trim().parse().map_err(|_| format!("bad width in '{}'", raw))?;
    let height: u32 = height.trim().parse().map_err(|_| format!("bad height in '{}'", raw))?;
    if width == 0 || height == 0 {
        return Err(format!("viewport must be non-empty, got '{}'", raw));
    }
    Ok((width, height))
}
