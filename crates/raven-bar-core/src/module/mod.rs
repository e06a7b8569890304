mod alt_format;
mod registry;
mod router;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::error::ModuleError;

pub use alt_format::{click_button, normalize_alt_click, CLICK_LEFT};
pub use registry::{ModuleEntry, ModuleRegistry, SharedModule};
pub use router::route_signal;

/// Placement of a module list inside the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Start,
    Center,
    End,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Start, Slot::Center, Slot::End];

    /// Key of the module name array in the bar config
    pub fn config_key(&self) -> &'static str {
        match self {
            Slot::Start => "modules-left",
            Slot::Center => "modules-center",
            Slot::End => "modules-right",
        }
    }
}

/// Contract every bar module implements.
///
/// Modules live on the main loop thread. `update` must return promptly;
/// blocking work belongs on the service runtime with the result posted back.
pub trait Module {
    /// Configured name, e.g. `"custom/mail"`
    fn name(&self) -> &str;

    /// Apply the latest state to the widget
    fn update(&mut self) -> Result<(), ModuleError>;

    /// Modules reacting to external refresh signals return themselves here
    fn refresher(&mut self) -> Option<&mut dyn Refresh> {
        None
    }
}

/// Capability for modules that refresh on an external signal number
pub trait Refresh {
    fn refresh(&mut self, signal: i32);
}

/// Builds modules from their config entry.
pub trait ModuleFactory {
    type Module: Module + ?Sized;

    /// `config` is the module's fragment, or `Value::Null` when the bar
    /// config has none. `update` is the module's own update trigger.
    fn make_module(
        &self,
        name: &str,
        config: &Value,
        update: UpdateSignal,
    ) -> Result<Box<Self::Module>, ModuleError>;
}

type Handler = Rc<dyn Fn()>;

/// One-to-many update notification, emitted and handled on the main loop
#[derive(Clone, Default)]
pub struct UpdateSignal {
    handlers: Rc<RefCell<Vec<Handler>>>,
}

impl UpdateSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, handler: impl Fn() + 'static) {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Run every handler in connection order
    pub fn emit(&self) {
        // Snapshot so handlers may connect or disconnect while running
        let handlers: Vec<Handler> = self.handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }

    pub fn disconnect_all(&self) {
        self.handlers.borrow_mut().clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl std::fmt::Debug for UpdateSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSignal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
