use compact_str::CompactString;
use serde_json::Value;

use crate::error::ConfigError;
use crate::geometry::{Layer, Margins, Position};
use crate::module::Slot;

/// Resolved view of one bar object from the config file.
///
/// The raw JSON is kept alongside because module fragments are looked up by
/// name at construction time.
#[derive(Debug, Clone)]
pub struct BarConfig {
    pub name: Option<CompactString>,
    pub position: Position,
    pub layer: Layer,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub margins: Margins,
    /// Let gtk4-layer-shell drive the surface instead of raw protocol calls
    pub gtk_layer_shell: bool,
    pub outputs: OutputFilter,
    pub modules_left: Vec<CompactString>,
    pub modules_center: Vec<CompactString>,
    pub modules_right: Vec<CompactString>,
    raw: Value,
}

impl BarConfig {
    pub fn resolve(raw: &Value) -> Result<Self, ConfigError> {
        if !raw.is_object() {
            return Err(ConfigError::NotAnObject);
        }

        Ok(Self {
            name: raw.get("name").and_then(Value::as_str).map(CompactString::from),
            position: Position::from_config(raw.get("position")),
            layer: Layer::from_config(raw.get("layer")),
            width: raw.get("width").and_then(as_u32),
            height: raw.get("height").and_then(as_u32),
            margins: Margins::from_config(raw),
            gtk_layer_shell: raw
                .get("gtk-layer-shell")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            outputs: OutputFilter::from_config(raw.get("output")),
            modules_left: module_names(raw, Slot::Start.config_key()),
            modules_center: module_names(raw, Slot::Center.config_key()),
            modules_right: module_names(raw, Slot::End.config_key()),
            raw: raw.clone(),
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut Value {
        &mut self.raw
    }

    /// Config fragment for a module entry, e.g. `"clock#utc"`
    pub fn module_config(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn modules(&self, slot: Slot) -> &[CompactString] {
        match slot {
            Slot::Start => &self.modules_left,
            Slot::Center => &self.modules_center,
            Slot::End => &self.modules_right,
        }
    }

    /// CSS classes the bar window carries
    pub fn style_classes(&self) -> Vec<CompactString> {
        let mut classes = Vec::with_capacity(2);
        if let Some(name) = &self.name {
            classes.push(name.clone());
        }
        classes.push(self.position.as_str().into());
        classes
    }
}

/// Which monitors a bar is created on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFilter {
    include: Vec<CompactString>,
    exclude: Vec<CompactString>,
}

impl OutputFilter {
    /// Accepts a connector name or a list of them; `!name` excludes
    pub fn from_config(value: Option<&Value>) -> Self {
        let mut filter = Self::default();
        let names: Vec<&str> = match value {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        for name in names {
            match name.strip_prefix('!') {
                Some(excluded) => filter.exclude.push(excluded.into()),
                None => filter.include.push(name.into()),
            }
        }
        filter
    }

    pub fn matches(&self, connector: &str) -> bool {
        if self.exclude.iter().any(|n| n == connector) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|n| n == connector)
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

fn module_names(raw: &Value, key: &str) -> Vec<CompactString> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(CompactString::from)
                .collect()
        })
        .unwrap_or_default()
}
