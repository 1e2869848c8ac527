use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const APP_DIR: &str = "lazymodal";
const CONFIG_FILE: &str = "config.toml";

/// `<config dir>/lazymodal/config.toml`, if the platform has a config dir.
fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the user configuration, falling back to defaults when there is none.
pub fn load() -> Result<AppConfig> {
    match default_path() {
        Some(path) => load_from(&path),
        None => {
            debug!("No config directory on this platform, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load from `path`. A missing file yields the defaults; a malformed one is an error.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str(&content)
        .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}
