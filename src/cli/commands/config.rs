//! Config inspection command.

use crate::config::{self, Config, ConfigError};
use crate::error::Result;

/// Print the config file location and the effective settings.
///
/// With `init`, the effective settings are first written to the standard
/// location unless a config file already exists there.
pub fn cmd_config(config: &Config, init: bool) -> Result<()> {
    let path = config::config_path();
    let exists = path.as_ref().is_some_and(|p| p.exists());

    if init && !exists {
        config::save(config)?;
    }

    match path {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not created, using defaults)", path.display()),
        None => println!("Config file: unavailable (no config directory)"),
    }
    println!();
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(config).map_err(ConfigError::Serialize)?)
}
