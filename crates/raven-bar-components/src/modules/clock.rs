use std::cell::Cell;
use std::fmt::{Display, Write};
use std::rc::Rc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use compact_str::CompactString;
use glib::ControlFlow;
use gtk4::prelude::*;
use gtk4::GestureClick;
use serde_json::Value;
use tracing::debug;

use raven_bar_core::module::CLICK_LEFT;
use raven_bar_core::{Module, ModuleError, UpdateSignal};

use super::{format_string, interval, GtkModule, ModuleLabel};

const DEFAULT_FORMAT: &str = "%H:%M";

/// Local time in a strftime format, with an optional alternate format
/// toggled by clicking
pub struct Clock {
    name: CompactString,
    label: ModuleLabel,
    format: String,
    format_alt: Option<String>,
    alt: Rc<Cell<bool>>,
    timer: Option<glib::SourceId>,
}

impl Clock {
    pub fn new(name: &str, config: &Value, update: UpdateSignal) -> Result<Self, ModuleError> {
        let format = format_string(config, "format").unwrap_or(DEFAULT_FORMAT).to_string();
        validate_format(&format)?;
        let format_alt = format_string(config, "format-alt").map(str::to_string);
        if let Some(format_alt) = &format_alt {
            validate_format(format_alt)?;
        }

        let label = ModuleLabel::new(name, "clock");
        let alt = Rc::new(Cell::new(false));

        if format_alt.is_some() {
            // Normalized to a button code when the bar was built
            let button = config
                .get("format-alt-click")
                .and_then(Value::as_u64)
                .map_or(CLICK_LEFT, |b| b as u32);
            let gesture = GestureClick::new();
            gesture.set_button(button);

            let alt = alt.clone();
            let update = update.clone();
            gesture.connect_released(move |_, _, _, _| {
                alt.set(!alt.get());
                update.emit();
            });
            label.add_controller(gesture);
        }

        let tick = update.clone();
        let timer = glib::timeout_add_local(interval(config, 60), move || {
            tick.emit();
            ControlFlow::Continue
        });
        // First paint once the bar has connected the update handler
        glib::idle_add_local_once(move || update.emit());

        Ok(Self {
            name: name.into(),
            label,
            format,
            format_alt,
            alt,
            timer: Some(timer),
        })
    }

    fn active_format(&self) -> &str {
        match &self.format_alt {
            Some(format_alt) if self.alt.get() => format_alt,
            _ => &self.format,
        }
    }
}

impl Module for Clock {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ModuleError> {
        let text = render(&chrono::Local::now(), self.active_format())?;
        self.label.set_text(&text);
        Ok(())
    }
}

impl GtkModule for Clock {
    fn widget(&self) -> gtk4::Widget {
        self.label.widget()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!("{}: stopping timer", self.name);
            timer.remove();
        }
    }
}

fn validate_format(format: &str) -> Result<(), ModuleError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ModuleError::invalid_config(format!(
            "invalid time format {:?}",
            format
        )));
    }
    Ok(())
}

fn render<Tz: TimeZone>(time: &DateTime<Tz>, format: &str) -> Result<String, ModuleError>
where
    Tz::Offset: Display,
{
    let mut text = String::new();
    write!(text, "{}", time.format(format))
        .map_err(|_| ModuleError::update(format!("cannot format time with {:?}", format)))?;
    Ok(text)
}
