use gtk4::prelude::*;
use gtk4::{gdk, Application, ApplicationWindow};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::{debug, trace};

use raven_bar_core::geometry::{Anchor, Edge as BarEdge, Layer as BarLayer, Margins, SurfaceSize};
use raven_bar_core::{BarWindow, DisplayConnection, LayerShellSurface, SurfaceError};

fn gls_edge(edge: BarEdge) -> Edge {
    match edge {
        BarEdge::Top => Edge::Top,
        BarEdge::Bottom => Edge::Bottom,
        BarEdge::Left => Edge::Left,
        BarEdge::Right => Edge::Right,
    }
}

fn gls_layer(layer: BarLayer) -> Layer {
    match layer {
        BarLayer::Top => Layer::Top,
        BarLayer::Bottom => Layer::Bottom,
    }
}

/// Undecorated application window pinned to one monitor
pub struct GtkBarWindow {
    window: ApplicationWindow,
    monitor: gdk::Monitor,
}

impl GtkBarWindow {
    pub fn new(app: &Application, monitor: &gdk::Monitor) -> Self {
        let window = ApplicationWindow::builder()
            .application(app)
            .decorated(false)
            .resizable(false)
            .build();

        Self {
            window,
            monitor: monitor.clone(),
        }
    }

    /// Get the underlying GTK window
    pub fn window(&self) -> &ApplicationWindow {
        &self.window
    }

    pub fn set_child(&self, child: Option<&impl IsA<gtk4::Widget>>) {
        self.window.set_child(child);
    }

    pub fn present(&self) {
        self.window.present();
    }
}

impl BarWindow for GtkBarWindow {
    fn init_layer_shell(&self, layer: BarLayer, namespace: &str) -> Box<dyn LayerShellSurface> {
        self.window.init_layer_shell();
        self.window.set_monitor(&self.monitor);
        self.window.set_layer(gls_layer(layer));
        self.window.set_namespace(namespace);

        debug!("Initialized layer shell: layer={:?}, namespace={}", layer, namespace);
        Box::new(ToolkitShell {
            window: self.window.clone(),
        })
    }

    fn set_size_request(&self, size: SurfaceSize) {
        self.window
            .set_size_request(size.width as i32, size.height as i32);
    }

    fn set_opacity(&self, opacity: f64) {
        self.window.set_opacity(opacity);
    }

    fn add_css_class(&self, class: &str) {
        self.window.add_css_class(class);
    }

    fn remove_css_class(&self, class: &str) {
        self.window.remove_css_class(class);
    }

    fn commit(&self) {
        // GTK commits the surface on its next frame
        self.window.queue_resize();
    }
}

/// Layer surface driven through gtk4-layer-shell.
///
/// The library sizes the surface from the window and acknowledges
/// configures itself.
struct ToolkitShell {
    window: ApplicationWindow,
}

impl LayerShellSurface for ToolkitShell {
    fn set_keyboard_interactivity(&self, enabled: bool) {
        let mode = if enabled {
            KeyboardMode::OnDemand
        } else {
            KeyboardMode::None
        };
        self.window.set_keyboard_mode(mode);
    }

    fn set_anchor(&self, anchor: Anchor) {
        for edge in BarEdge::ALL {
            self.window.set_anchor(gls_edge(edge), anchor.contains(edge));
        }
    }

    fn set_margin(&self, margins: &Margins) {
        self.window.set_margin(Edge::Top, margins.top);
        self.window.set_margin(Edge::Right, margins.right);
        self.window.set_margin(Edge::Bottom, margins.bottom);
        self.window.set_margin(Edge::Left, margins.left);
    }

    fn set_size(&self, size: SurfaceSize) {
        trace!("Surface size {} follows the window size request", size);
    }

    fn set_exclusive_zone(&self, zone: u32) {
        self.window.set_exclusive_zone(zone as i32);
    }

    fn ack_configure(&self, _serial: u32) {}

    fn destroy(&self) {
        self.window.close();
    }
}

/// Display connection as seen through GTK.
///
/// GTK4 owns the role of every `wl_surface` it creates, so raw layer
/// surfaces cannot be requested here. `"gtk-layer-shell": false` is accepted
/// in the config but ignored: such bars run through gtk4-layer-shell too.
pub struct GtkDisplay;

impl DisplayConnection for GtkDisplay {
    fn get_layer_surface(
        &self,
        _output: &str,
        _layer: BarLayer,
        _namespace: &str,
    ) -> Result<Box<dyn LayerShellSurface>, SurfaceError> {
        Err(SurfaceError::LayerShellUnavailable)
    }

    fn roundtrip(&self) -> Result<(), SurfaceError> {
        if let Some(display) = gdk::Display::default() {
            display.sync();
        }
        Ok(())
    }
}

/// Whether the compositor supports layer surfaces at all
pub fn layer_shell_supported() -> bool {
    gtk4_layer_shell::is_supported()
}
