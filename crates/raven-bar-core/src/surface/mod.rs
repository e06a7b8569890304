mod adapter;

use crate::error::SurfaceError;
use crate::geometry::{Anchor, Layer, Margins, SurfaceSize};

pub use adapter::{ShellMode, SurfaceAdapter, SurfaceState};

/// Layer-shell namespace for all bar surfaces
pub const NAMESPACE: &str = "raven-bar";

/// Requests on a layer surface.
///
/// Implemented by a raw `zwlr_layer_surface_v1` binding and by the toolkit
/// helper; the toolkit helper acknowledges configures itself, so its
/// `set_size` and `ack_configure` may be no-ops.
pub trait LayerShellSurface {
    fn set_keyboard_interactivity(&self, enabled: bool);
    fn set_anchor(&self, anchor: Anchor);
    fn set_margin(&self, margins: &Margins);
    fn set_size(&self, size: SurfaceSize);
    fn set_exclusive_zone(&self, zone: u32);
    fn ack_configure(&self, serial: u32);
    fn destroy(&self);
}

/// Process-wide display connection shared by every bar.
///
/// Created once at startup and passed by reference; requests from one bar
/// stay ordered, nothing is guaranteed across bars.
pub trait DisplayConnection {
    fn get_layer_surface(
        &self,
        output: &str,
        layer: Layer,
        namespace: &str,
    ) -> Result<Box<dyn LayerShellSurface>, SurfaceError>;

    /// Block until the compositor processed every request sent so far
    fn roundtrip(&self) -> Result<(), SurfaceError>;
}

/// Toolkit window hosting the bar contents
pub trait BarWindow {
    /// Set the window up through the toolkit's layer-shell integration.
    /// Must run before the toolkit realizes the window.
    fn init_layer_shell(&self, layer: Layer, namespace: &str) -> Box<dyn LayerShellSurface>;

    fn set_size_request(&self, size: SurfaceSize);
    fn set_opacity(&self, opacity: f64);
    fn add_css_class(&self, class: &str);
    fn remove_css_class(&self, class: &str);

    /// Commit pending state on the underlying `wl_surface`
    fn commit(&self);
}
