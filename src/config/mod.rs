mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./mkvsplit.toml", "~/.config/mkvsplit/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_split(&config.split)
}

fn validate_split(split: &SplitConfig) -> Result<()> {
    if split.chunk_size == 0 {
        anyhow::bail!("Chunk size cannot be 0");
    }

    if split.extension.is_empty() {
        anyhow::bail!("Output extension cannot be empty");
    }

    if split.extension.contains(['/', '\\']) {
        anyhow::bail!(
            "Output extension '{}' must not contain path separators",
            split.extension
        );
    }

    if split.output_prefix.as_os_str().is_empty() {
        anyhow::bail!("Output prefix cannot be empty");
    }

    Ok(())
}
