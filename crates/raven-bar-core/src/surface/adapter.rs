use compact_str::CompactString;
use tracing::{debug, error, info};

use super::{BarWindow, DisplayConnection, LayerShellSurface, NAMESPACE};
use crate::error::SurfaceError;
use crate::geometry::{Geometry, Layer, SurfaceSize};

/// Who drives the layer surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellMode {
    /// The toolkit's layer-shell integration owns the surface
    Toolkit,
    /// Raw `zwlr_layer_shell_v1` requests on the shared connection
    Protocol,
}

/// Lifecycle of the bar's shell surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Unrealized,
    Realized,
    Mapped,
    SurfaceRequested,
    Configured,
    Closed,
}

/// Negotiates the bar surface with the compositor.
///
/// Owns the bar geometry and keeps the compositor, the toolkit window and
/// the stored size in agreement across configure events.
pub struct SurfaceAdapter<W> {
    window: W,
    mode: ShellMode,
    output: CompactString,
    layer: Layer,
    geometry: Geometry,
    state: SurfaceState,
    shell: Option<Box<dyn LayerShellSurface>>,
}

impl<W> SurfaceAdapter<W> {
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn is_closed(&self) -> bool {
        self.state == SurfaceState::Closed
    }
}

impl<W: BarWindow> SurfaceAdapter<W> {
    pub fn new(
        window: W,
        mode: ShellMode,
        output: impl Into<CompactString>,
        layer: Layer,
        geometry: Geometry,
    ) -> Self {
        Self {
            window,
            mode,
            output: output.into(),
            layer,
            geometry,
            state: SurfaceState::Unrealized,
            shell: None,
        }
    }

    /// The toolkit is about to realize the window.
    ///
    /// In toolkit mode this performs the whole shell setup; raw protocol
    /// setup waits for [`map`](Self::map).
    pub fn realize(&mut self) {
        if self.state != SurfaceState::Unrealized {
            self.violation("realize");
            return;
        }

        self.window.set_size_request(self.geometry.size);

        if self.mode == ShellMode::Toolkit {
            let shell = self.window.init_layer_shell(self.layer, NAMESPACE);
            shell.set_keyboard_interactivity(false);
            shell.set_anchor(self.geometry.anchor);
            shell.set_margin(&self.geometry.margins);
            // No configure arrives while the initial size is kept
            if self.geometry.has_explicit_size() {
                shell.set_exclusive_zone(self.geometry.exclusive_zone());
            }
            self.shell = Some(shell);
        }

        debug!("Realized bar surface on {} ({:?})", self.output, self.mode);
        self.state = SurfaceState::Realized;
    }

    /// The window was mapped; in protocol mode request the layer surface.
    pub fn map(&mut self, display: &dyn DisplayConnection) -> Result<(), SurfaceError> {
        if self.state != SurfaceState::Realized {
            self.violation("map");
            return Ok(());
        }
        self.state = SurfaceState::Mapped;

        if self.mode == ShellMode::Toolkit {
            return Ok(());
        }

        let surface = display.get_layer_surface(&self.output, self.layer, NAMESPACE)?;
        surface.set_keyboard_interactivity(false);
        surface.set_anchor(self.geometry.anchor);
        surface.set_margin(&self.geometry.margins);
        let requested = self.geometry.requested_size();
        debug!("Set surface size {} for output {}", requested, self.output);
        surface.set_size(requested);
        surface.set_exclusive_zone(self.geometry.exclusive_zone());
        self.shell = Some(surface);
        self.state = SurfaceState::SurfaceRequested;

        self.window.commit();
        display.roundtrip()
    }

    /// Handle a layer-surface configure event.
    ///
    /// Returns whether the stored size changed. The serial is acknowledged
    /// either way.
    pub fn configure(&mut self, serial: u32, proposed: SurfaceSize) -> bool {
        if !matches!(
            self.state,
            SurfaceState::SurfaceRequested | SurfaceState::Configured
        ) {
            self.violation("configure");
            return false;
        }
        let Some(shell) = self.shell.take() else {
            self.violation("configure without surface");
            return false;
        };

        let changed = self.apply_size(proposed);
        if changed {
            self.window.set_size_request(self.geometry.size);
            shell.set_exclusive_zone(self.geometry.exclusive_zone());
            info!("Bar configured ({}) for output {}", self.geometry.size, self.output);
            self.window.commit();
        }
        shell.ack_configure(serial);

        self.shell = Some(shell);
        self.state = SurfaceState::Configured;
        changed
    }

    /// Handle a size change reported by the toolkit in toolkit mode.
    pub fn toolkit_configure(&mut self, proposed: SurfaceSize) -> bool {
        if self.mode != ShellMode::Toolkit
            || !matches!(
                self.state,
                SurfaceState::Realized | SurfaceState::Mapped | SurfaceState::Configured
            )
        {
            self.violation("toolkit configure");
            return false;
        }

        let changed = self.apply_size(proposed);
        debug!("Set surface size {} for output {}", self.geometry.size, self.output);
        if let Some(shell) = &self.shell {
            shell.set_exclusive_zone(self.geometry.exclusive_zone());
        }
        self.state = SurfaceState::Configured;
        changed
    }

    /// Show or hide the bar without touching anchor, margins or size
    pub fn toggle(&mut self) -> bool {
        if self.is_closed() {
            self.violation("toggle");
            return false;
        }

        let visible = self.geometry.toggle();
        if visible {
            self.window.remove_css_class("hidden");
            self.window.set_opacity(1.0);
        } else {
            self.window.add_css_class("hidden");
            self.window.set_opacity(0.0);
        }

        let zone = self.geometry.exclusive_zone();
        debug!("Set exclusive zone {} for output {}", zone, self.output);
        if let Some(shell) = &self.shell {
            shell.set_exclusive_zone(zone);
        }
        self.window.commit();
        visible
    }

    /// The compositor closed the surface; nothing is valid afterwards
    pub fn close(&mut self) {
        if self.is_closed() {
            debug!("Bar on {} already closed", self.output);
            return;
        }
        if let Some(shell) = self.shell.take() {
            shell.destroy();
        }
        info!("Bar surface on {} closed", self.output);
        self.state = SurfaceState::Closed;
    }

    fn apply_size(&mut self, proposed: SurfaceSize) -> bool {
        let effective = self.geometry.reconcile(proposed);
        let changed = effective != self.geometry.size;
        self.geometry.size = effective;
        changed
    }

    fn violation(&self, event: &str) {
        if cfg!(debug_assertions) {
            panic!("{} in state {:?} on output {}", event, self.state, self.output);
        }
        error!("Ignoring {} in state {:?} on output {}", event, self.state, self.output);
    }
}
