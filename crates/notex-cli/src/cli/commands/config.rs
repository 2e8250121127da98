//! Config command handlers.

use anyhow::{Context, Result};
use notex_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn open() -> Result<()> {
    let config_path = config::paths::config_path();
    if !config_path.exists() {
        anyhow::bail!(
            "No config file at {} (run `notex config init` first)",
            config_path.display()
        );
    }
    open::that(&config_path).with_context(|| format!("open {}", config_path.display()))?;
    Ok(())
}
