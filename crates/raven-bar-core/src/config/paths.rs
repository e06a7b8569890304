use std::path::PathBuf;

/// Configuration and runtime paths for the bar
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config: PathBuf,
    pub style: PathBuf,
    pub socket: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("raven-bar");

        Self {
            config: config_dir.join("config.json"),
            style: config_dir.join("style.css"),
            socket: Self::socket_path(),
        }
    }

    /// Override paths from the command line
    pub fn with_overrides(mut self, config: Option<PathBuf>, style: Option<PathBuf>) -> Self {
        if let Some(config) = config {
            self.config = config;
        }
        if let Some(style) = style {
            self.style = style;
        }
        self
    }

    /// IPC socket path, shared with `raven-bar-ctl`
    pub fn socket_path() -> PathBuf {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
            .unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(runtime_dir).join("raven-bar.sock")
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}
