pub mod bar;
pub mod config;
pub mod error;
pub mod geometry;
pub mod messages;
pub mod module;
pub mod services;
pub mod surface;

#[cfg(test)]
mod testing;

pub use bar::{Bar, BarStatus};
pub use config::{load_bar_configs, parse_bar_configs, BarConfig, ConfigPaths, OutputFilter};
pub use error::{ConfigError, ModuleError, SurfaceError};
pub use geometry::{Anchor, Edge, Geometry, Layer, Margins, Position, SurfaceSize};
pub use messages::{BarCommand, BarEvent, IpcRequest};
pub use module::{
    click_button, Module, ModuleFactory, ModuleRegistry, Refresh, SharedModule, Slot,
    UpdateSignal,
};
pub use services::ServiceHub;
pub use surface::{
    BarWindow, DisplayConnection, LayerShellSurface, ShellMode, SurfaceState, NAMESPACE,
};
