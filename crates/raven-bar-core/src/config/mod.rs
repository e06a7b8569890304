mod bar;
mod loader;
mod paths;

pub use bar::{BarConfig, OutputFilter};
pub use loader::{default_config, load_bar_configs, parse_bar_configs};
pub use paths::ConfigPaths;
