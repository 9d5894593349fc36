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

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./unfurl.toml",
        "~/.config/unfurl/config.toml",
        "/etc/unfurl/config.toml",
    ];

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
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.resolution.timeout_secs == 0 {
        anyhow::bail!("Resolution timeout cannot be 0");
    }

    if config.resolution.requests_per_sec == 0 {
        anyhow::bail!("Resolution request budget cannot be 0");
    }

    match (&config.upstream.host, &config.upstream.token) {
        (Some(_), None) => {
            anyhow::bail!("Upstream host is configured but has no token");
        }
        (None, Some(_)) => {
            anyhow::bail!("Upstream token is configured but has no host");
        }
        _ => {}
    }

    Ok(())
}
