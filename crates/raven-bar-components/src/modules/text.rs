use compact_str::CompactString;
use gtk4::prelude::*;
use serde_json::Value;

use raven_bar_core::{Module, ModuleError};

use super::{format_string, GtkModule, ModuleLabel};

/// Static markup from `format`
pub struct Text {
    name: CompactString,
    label: ModuleLabel,
}

impl Text {
    pub fn new(name: &str, config: &Value) -> Result<Self, ModuleError> {
        let format = format_string(config, "format")
            .ok_or_else(|| ModuleError::invalid_config("missing format"))?;

        let label = ModuleLabel::new(name, "text");
        label.set_text(format);
        if let Some(tooltip) = format_string(config, "tooltip") {
            label.widget().set_tooltip_markup(Some(tooltip));
        }

        Ok(Self {
            name: name.into(),
            label,
        })
    }
}

impl Module for Text {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }
}

impl GtkModule for Text {
    fn widget(&self) -> gtk4::Widget {
        self.label.widget()
    }
}
