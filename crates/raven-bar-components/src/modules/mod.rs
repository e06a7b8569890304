mod clock;
mod custom;
mod text;

use std::time::Duration;

use gtk4::prelude::*;
use gtk4::{Box as GtkBox, Label, Orientation};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::debug;

use raven_bar_core::{Module, ModuleError, ModuleFactory, UpdateSignal};

pub use clock::Clock;
pub use custom::Custom;
pub use text::Text;

/// A module with a widget packed into the bar
pub trait GtkModule: Module {
    fn widget(&self) -> gtk4::Widget;
}

/// Builds the built-in modules from their config entry
pub struct GtkModuleFactory {
    runtime: Handle,
}

impl GtkModuleFactory {
    /// `runtime` runs the blocking work of `custom/*` modules
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl ModuleFactory for GtkModuleFactory {
    type Module = dyn GtkModule;

    fn make_module(
        &self,
        name: &str,
        config: &Value,
        update: UpdateSignal,
    ) -> Result<Box<dyn GtkModule>, ModuleError> {
        if config.get("disabled").and_then(Value::as_bool) == Some(true) {
            return Err(ModuleError::Disabled);
        }

        let module: Box<dyn GtkModule> = match module_kind(name) {
            "clock" => Box::new(Clock::new(name, config, update)?),
            "text" => Box::new(Text::new(name, config)?),
            kind if kind.starts_with("custom/") => {
                Box::new(Custom::new(name, config, update, self.runtime.clone())?)
            }
            _ => return Err(ModuleError::Unknown),
        };
        debug!("Built module {}", name);
        Ok(module)
    }
}

/// Module kind of a configured name; `clock#utc` is a `clock`
pub fn module_kind(name: &str) -> &str {
    name.split_once('#').map_or(name, |(kind, _)| kind)
}

/// `interval` in seconds, at least one second
pub(crate) fn interval(config: &Value, default_secs: u64) -> Duration {
    let secs = config
        .get("interval")
        .and_then(Value::as_u64)
        .unwrap_or(default_secs)
        .max(1);
    Duration::from_secs(secs)
}

pub(crate) fn format_string<'a>(config: &'a Value, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}

/// Label inside a box carrying the module's CSS classes
pub(crate) struct ModuleLabel {
    container: GtkBox,
    label: Label,
}

impl ModuleLabel {
    pub(crate) fn new(name: &str, class: &str) -> Self {
        let container = GtkBox::new(Orientation::Horizontal, 0);
        container.add_css_class("module");
        container.add_css_class(class);
        if let Some((_, id)) = name.split_once('#') {
            container.set_widget_name(id);
        }

        let label = Label::new(None);
        container.append(&label);

        Self { container, label }
    }

    pub(crate) fn set_text(&self, text: &str) {
        self.label.set_markup(text);
        self.container.set_visible(!text.is_empty());
    }

    pub(crate) fn add_controller(&self, controller: impl IsA<gtk4::EventController>) {
        self.container.add_controller(controller);
    }

    pub(crate) fn set_error(&self, failed: bool) {
        if failed {
            self.container.add_css_class("error");
        } else {
            self.container.remove_css_class("error");
        }
    }

    pub(crate) fn widget(&self) -> gtk4::Widget {
        self.container.clone().upcast()
    }
}
