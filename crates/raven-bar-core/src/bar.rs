use std::fmt;

use compact_str::CompactString;
use tracing::{info, warn};

use crate::config::BarConfig;
use crate::error::SurfaceError;
use crate::geometry::{Geometry, SurfaceSize};
use crate::module::{Module, ModuleFactory, ModuleRegistry};
use crate::surface::{BarWindow, DisplayConnection, ShellMode, SurfaceAdapter, SurfaceState};

/// One bar on one output
pub struct Bar<W, M: ?Sized> {
    config: BarConfig,
    surface: SurfaceAdapter<W>,
    modules: ModuleRegistry<M>,
}

impl<W: BarWindow, M: Module + ?Sized + 'static> Bar<W, M> {
    /// Build the modules and realize the surface.
    ///
    /// `window` must not be realized by the toolkit yet.
    pub fn new<F>(mut config: BarConfig, output: &str, window: W, factory: &F) -> Self
    where
        F: ModuleFactory<Module = M>,
    {
        window.add_css_class("raven-bar");
        window.add_css_class(output);
        for class in config.style_classes() {
            window.add_css_class(&class);
        }

        let mode = if config.gtk_layer_shell {
            ShellMode::Toolkit
        } else {
            ShellMode::Protocol
        };
        let geometry = Geometry::from_config(&config);
        let modules = ModuleRegistry::build(&mut config, factory);

        let mut surface = SurfaceAdapter::new(window, mode, output, config.layer, geometry);
        surface.realize();

        info!(
            "Created {} bar on {} with {} modules",
            config.position.as_str(),
            output,
            modules.len()
        );
        Self {
            config,
            surface,
            modules,
        }
    }

    pub fn on_map(&mut self, display: &dyn DisplayConnection) -> Result<(), SurfaceError> {
        self.surface.map(display)
    }

    pub fn on_configure(&mut self, serial: u32, width: u32, height: u32) -> bool {
        self.surface.configure(serial, SurfaceSize::new(width, height))
    }

    pub fn on_toolkit_configure(&mut self, width: u32, height: u32) -> bool {
        self.surface.toolkit_configure(SurfaceSize::new(width, height))
    }

    pub fn toggle(&mut self) -> bool {
        self.surface.toggle()
    }

    /// Route an external refresh signal to the modules
    pub fn handle_signal(&self, signal: i32) -> usize {
        if self.is_closed() {
            warn!("Signal {} for closed bar on {}", signal, self.output());
            return 0;
        }
        self.modules.handle_signal(signal)
    }

    /// Compositor closed the surface: destroy it and release every module
    pub fn close(&mut self) {
        self.surface.close();
        self.modules.clear();
    }
}

impl<W, M: ?Sized> Bar<W, M> {
    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    pub fn output(&self) -> &str {
        self.surface.output()
    }

    pub fn geometry(&self) -> &Geometry {
        self.surface.geometry()
    }

    pub fn state(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn is_closed(&self) -> bool {
        self.surface.is_closed()
    }

    pub fn window(&self) -> &W {
        self.surface.window()
    }

    pub fn modules(&self) -> &ModuleRegistry<M> {
        &self.modules
    }

    pub fn status(&self) -> BarStatus {
        let geometry = self.geometry();
        BarStatus {
            output: self.output().into(),
            name: self.config.name.clone(),
            state: self.state(),
            visible: geometry.visible,
            size: geometry.size,
            exclusive_zone: geometry.exclusive_zone(),
            modules: self.modules.len(),
        }
    }
}

/// Snapshot of a bar for the `status` IPC command
#[derive(Debug, Clone, PartialEq)]
pub struct BarStatus {
    pub output: CompactString,
    pub name: Option<CompactString>,
    pub state: SurfaceState,
    pub visible: bool,
    pub size: SurfaceSize,
    pub exclusive_zone: u32,
    pub modules: usize,
}

impl fmt::Display for BarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output)?;
        if let Some(name) = &self.name {
            write!(f, " ({})", name)?;
        }
        write!(
            f,
            ": {:?}, {}, size {}, zone {}, {} modules",
            self.state,
            if self.visible { "visible" } else { "hidden" },
            self.size,
            self.exclusive_zone,
            self.modules
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Slot;
    use crate::testing::{FakeDisplay, FakeFactory, FakeWindow, WindowCall};
    use serde_json::json;

    fn bar(raw: serde_json::Value, factory: &FakeFactory) -> Bar<FakeWindow, dyn Module> {
        let config = BarConfig::resolve(&raw).unwrap();
        Bar::new(config, "DP-1", FakeWindow::default(), factory)
    }

    #[test]
    fn test_new_bar_is_realized_with_classes() {
        let factory = FakeFactory::default();
        let bar = bar(json!({ "name": "main", "position": "bottom" }), &factory);

        assert_eq!(bar.state(), SurfaceState::Realized);
        assert_eq!(bar.window().classes(), ["raven-bar", "DP-1", "main", "bottom"]);
    }

    #[test]
    fn test_close_releases_modules() {
        let factory = FakeFactory::default();
        let display = FakeDisplay::default();
        let mut bar = bar(
            json!({
                "gtk-layer-shell": false,
                "modules-left": ["refresh/a"],
                "modules-right": ["b", "c"],
            }),
            &factory,
        );
        bar.on_map(&display).unwrap();
        bar.on_configure(1, 1920, 30);
        assert_eq!(bar.modules().list(Slot::End).len(), 2);

        bar.close();

        assert!(bar.is_closed());
        assert!(bar.modules().is_empty());
        assert_eq!(bar.handle_signal(3), 0);
        assert!(factory.log().borrow().is_empty());
    }

    #[test]
    fn test_accessors_follow_surface() {
        let factory = FakeFactory::default();
        let display = FakeDisplay::default();
        let mut bar = bar(json!({ "gtk-layer-shell": false, "height": 30 }), &factory);
        assert_eq!(bar.output(), "DP-1");
        assert_eq!(bar.state(), SurfaceState::Realized);

        bar.on_map(&display).unwrap();
        assert_eq!(bar.state(), SurfaceState::SurfaceRequested);
        assert!(bar.on_configure(4, 1920, 30));

        assert_eq!(bar.state(), SurfaceState::Configured);
        assert_eq!(bar.geometry().size, SurfaceSize::new(1920, 30));
        assert!(!bar.is_closed());
        assert!(bar.window().calls().contains(&WindowCall::Commit));
    }

    #[test]
    fn test_signal_before_close() {
        let factory = FakeFactory::default();
        let bar = bar(json!({ "modules-center": ["refresh/x", "y"] }), &factory);
        assert_eq!(bar.handle_signal(5), 1);
        assert_eq!(*factory.log().borrow(), ["refresh/x 5"]);
    }

    #[test]
    fn test_status_line() {
        let factory = FakeFactory::default();
        let mut bar = bar(json!({ "height": 30, "modules-left": ["a"] }), &factory);
        bar.on_toolkit_configure(1920, 30);
        bar.toggle();

        let status = bar.status();
        assert!(!status.visible);
        assert_eq!(status.exclusive_zone, 0);
        assert_eq!(
            status.to_string(),
            "DP-1: Configured, hidden, size 1920x30, zone 0, 1 modules"
        );
    }
}
