mod layer_window;

pub use layer_window::{layer_shell_supported, GtkBarWindow, GtkDisplay};
