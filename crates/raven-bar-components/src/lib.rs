pub mod common;
pub mod modules;
pub mod theme;
pub mod view;

pub use common::{layer_shell_supported, GtkBarWindow, GtkDisplay};
pub use modules::{module_kind, Clock, Custom, GtkModule, GtkModuleFactory, Text};
pub use theme::{StyleManager, BAR_CSS};
pub use view::BarView;

/// A bar hosted in a GTK window with the built-in modules
pub type GtkBar = raven_bar_core::Bar<GtkBarWindow, dyn GtkModule>;
