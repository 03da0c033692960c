use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the vidtool config directory
pub fn vidtool_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("vidtool");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(vidtool_config_dir()?.join("config.toml"))
}
