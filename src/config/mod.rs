mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./dubforge.toml", "~/.config/dubforge/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    validate_config(Config::default())
}

/// Validate configuration, normalising the settings table.
fn validate_config(mut config: Config) -> Result<Config> {
    config.settings = config.settings.validate()?;

    if config.translator.timeout_secs == 0 {
        anyhow::bail!("translator.timeout_secs must be greater than 0");
    }

    if config.translator.endpoint.trim().is_empty() {
        anyhow::bail!("translator.endpoint cannot be empty");
    }

    for (name, path) in [
        ("yt_dlp_path", &config.tools.yt_dlp_path),
        ("ffmpeg_path", &config.tools.ffmpeg_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("tools.{} does not exist: {:?}", name, path);
            }
        }
    }

    Ok(config)
}
