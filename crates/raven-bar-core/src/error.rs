use std::path::PathBuf;

use compact_str::CompactString;
use thiserror::Error;

/// Errors raised while loading or resolving the bar configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bar configuration must be an object or an array of objects")]
    NotAnObject,

    #[error("invalid margins: {0}")]
    InvalidMargins(String),
}

/// Errors raised by modules, either while being built or while updating
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    #[error("unknown module type")]
    Unknown,

    #[error("disabled by configuration")]
    Disabled,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Update(String),
}

impl ModuleError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }
}

/// Errors raised by the compositor shell-surface backend
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("compositor does not offer the layer-shell global")]
    LayerShellUnavailable,

    #[error("no wl_output for {0}")]
    UnknownOutput(CompactString),

    #[error("display roundtrip failed: {0}")]
    Roundtrip(String),
}
