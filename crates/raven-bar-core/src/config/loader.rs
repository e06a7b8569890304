use std::path::Path;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::BarConfig;
use crate::error::ConfigError;

/// Config used when no config file exists
pub fn default_config() -> Value {
    json!({
        "position": "top",
        "modules-left": [],
        "modules-center": ["clock"],
        "modules-right": [],
    })
}

/// Load every bar defined in `path`.
///
/// A missing file yields the built-in default bar; unreadable or invalid
/// files are errors.
pub fn load_bar_configs(path: &Path) -> Result<Vec<BarConfig>, ConfigError> {
    let raw = match std::fs::read(path) {
        Ok(data) => serde_json::from_slice::<Value>(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {:?}, using defaults", path);
            default_config()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_bar_configs(&raw)
}

/// Accepts a single bar object or an array of bar objects
pub fn parse_bar_configs(raw: &Value) -> Result<Vec<BarConfig>, ConfigError> {
    match raw {
        Value::Object(_) => Ok(vec![BarConfig::resolve(raw)?]),
        Value::Array(bars) => {
            let configs: Vec<BarConfig> = bars
                .iter()
                .filter_map(|bar| match BarConfig::resolve(bar) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        warn!("Skipping bar config: {}", e);
                        None
                    }
                })
                .collect();
            Ok(configs)
        }
        _ => Err(ConfigError::NotAnObject),
    }
}
