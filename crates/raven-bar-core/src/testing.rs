//! Recording doubles for the surface and module seams.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{ModuleError, SurfaceError};
use crate::geometry::{Anchor, Layer, Margins, SurfaceSize};
use crate::module::{Module, ModuleFactory, Refresh, UpdateSignal};
use crate::surface::{BarWindow, DisplayConnection, LayerShellSurface};

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCall {
    Create(String, Layer, String),
    KeyboardInteractivity(bool),
    Anchor(Anchor),
    Margin(Margins),
    Size(SurfaceSize),
    ExclusiveZone(u32),
    Ack(u32),
    Destroy,
}

type CallLog = Rc<RefCell<Vec<ShellCall>>>;

pub struct FakeShell {
    log: CallLog,
}

impl LayerShellSurface for FakeShell {
    fn set_keyboard_interactivity(&self, enabled: bool) {
        self.log.borrow_mut().push(ShellCall::KeyboardInteractivity(enabled));
    }

    fn set_anchor(&self, anchor: Anchor) {
        self.log.borrow_mut().push(ShellCall::Anchor(anchor));
    }

    fn set_margin(&self, margins: &Margins) {
        self.log.borrow_mut().push(ShellCall::Margin(*margins));
    }

    fn set_size(&self, size: SurfaceSize) {
        self.log.borrow_mut().push(ShellCall::Size(size));
    }

    fn set_exclusive_zone(&self, zone: u32) {
        self.log.borrow_mut().push(ShellCall::ExclusiveZone(zone));
    }

    fn ack_configure(&self, serial: u32) {
        self.log.borrow_mut().push(ShellCall::Ack(serial));
    }

    fn destroy(&self) {
        self.log.borrow_mut().push(ShellCall::Destroy);
    }
}

pub struct FakeDisplay {
    log: CallLog,
    roundtrips: Cell<usize>,
    layer_shell: bool,
}

impl Default for FakeDisplay {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            roundtrips: Cell::new(0),
            layer_shell: true,
        }
    }
}

impl FakeDisplay {
    pub fn without_layer_shell() -> Self {
        Self {
            layer_shell: false,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn roundtrips(&self) -> usize {
        self.roundtrips.get()
    }
}

impl DisplayConnection for FakeDisplay {
    fn get_layer_surface(
        &self,
        output: &str,
        layer: Layer,
        namespace: &str,
    ) -> Result<Box<dyn LayerShellSurface>, SurfaceError> {
        if !self.layer_shell {
            return Err(SurfaceError::LayerShellUnavailable);
        }
        self.log
            .borrow_mut()
            .push(ShellCall::Create(output.to_string(), layer, namespace.to_string()));
        Ok(Box::new(FakeShell {
            log: self.log.clone(),
        }))
    }

    fn roundtrip(&self) -> Result<(), SurfaceError> {
        self.roundtrips.set(self.roundtrips.get() + 1);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowCall {
    SizeRequest(SurfaceSize),
    Opacity(f64),
    Commit,
}

#[derive(Default)]
pub struct FakeWindow {
    calls: RefCell<Vec<WindowCall>>,
    classes: RefCell<Vec<String>>,
    shell: CallLog,
}

impl FakeWindow {
    pub fn calls(&self) -> Vec<WindowCall> {
        self.calls.borrow().clone()
    }

    pub fn shell_calls(&self) -> Vec<ShellCall> {
        self.shell.borrow().clone()
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
        self.shell.borrow_mut().clear();
    }
}

impl BarWindow for FakeWindow {
    fn init_layer_shell(&self, layer: Layer, namespace: &str) -> Box<dyn LayerShellSurface> {
        self.shell
            .borrow_mut()
            .push(ShellCall::Create(String::new(), layer, namespace.to_string()));
        Box::new(FakeShell {
            log: self.shell.clone(),
        })
    }

    fn set_size_request(&self, size: SurfaceSize) {
        self.calls.borrow_mut().push(WindowCall::SizeRequest(size));
    }

    fn set_opacity(&self, opacity: f64) {
        self.calls.borrow_mut().push(WindowCall::Opacity(opacity));
    }

    fn add_css_class(&self, class: &str) {
        self.classes.borrow_mut().push(class.to_string());
    }

    fn remove_css_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }

    fn commit(&self) {
        self.calls.borrow_mut().push(WindowCall::Commit);
    }
}

type EventLog = Rc<RefCell<Vec<String>>>;

/// Module whose behavior is picked by its name: `refresh/*` modules can be
/// refreshed and `fail-update` fails every update.
pub struct FakeModule {
    name: String,
    log: EventLog,
}

impl Module for FakeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ModuleError> {
        self.log.borrow_mut().push(format!("update {}", self.name));
        if self.name == "fail-update" {
            return Err(ModuleError::update("backend went away"));
        }
        Ok(())
    }

    fn refresher(&mut self) -> Option<&mut dyn Refresh> {
        if self.name.starts_with("refresh/") {
            Some(self)
        } else {
            None
        }
    }
}

impl Refresh for FakeModule {
    fn refresh(&mut self, signal: i32) {
        self.log.borrow_mut().push(format!("{} {}", self.name, signal));
    }
}

#[derive(Default)]
pub struct FakeFactory {
    failing: Vec<String>,
    attempts: Cell<usize>,
    log: EventLog,
    fragments: RefCell<HashMap<String, Value>>,
}

impl FakeFactory {
    pub fn failing<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            failing: names.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn fragment(&self, name: &str) -> Option<Value> {
        self.fragments.borrow().get(name).cloned()
    }
}

impl ModuleFactory for FakeFactory {
    type Module = dyn Module;

    fn make_module(
        &self,
        name: &str,
        config: &Value,
        _update: UpdateSignal,
    ) -> Result<Box<dyn Module>, ModuleError> {
        self.attempts.set(self.attempts.get() + 1);
        self.fragments
            .borrow_mut()
            .insert(name.to_string(), config.clone());

        if self.failing.iter().any(|f| f == name) {
            return Err(ModuleError::invalid_config("missing exec"));
        }
        Ok(Box::new(FakeModule {
            name: name.to_string(),
            log: self.log.clone(),
        }))
    }
}
