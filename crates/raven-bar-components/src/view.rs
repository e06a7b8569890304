use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, CenterBox, Orientation};
use tracing::warn;

use raven_bar_core::{ModuleRegistry, Slot};

use crate::modules::GtkModule;

/// The three module rows of a bar.
///
/// Start and center rows follow their list order. The end row is packed
/// from the center outwards, so index 0 of the end list sits next to the
/// center.
pub struct BarView {
    root: CenterBox,
}

impl BarView {
    pub fn build(registry: &ModuleRegistry<dyn GtkModule>, vertical: bool) -> Self {
        let orientation = if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };

        let root = CenterBox::new();
        root.set_orientation(orientation);
        root.add_css_class("bar-box");

        root.set_start_widget(Some(&Self::row(registry, Slot::Start, orientation)));
        root.set_center_widget(Some(&Self::row(registry, Slot::Center, orientation)));
        root.set_end_widget(Some(&Self::row(registry, Slot::End, orientation)));

        Self { root }
    }

    fn row(registry: &ModuleRegistry<dyn GtkModule>, slot: Slot, orientation: Orientation) -> GtkBox {
        let row = GtkBox::new(orientation, 0);
        row.add_css_class(slot.config_key());
        match (slot, orientation) {
            (Slot::End, Orientation::Vertical) => row.set_valign(Align::End),
            (Slot::End, _) => row.set_halign(Align::End),
            _ => {}
        }

        for entry in registry.list(slot) {
            let Ok(module) = entry.module().try_borrow() else {
                warn!("{}: busy while packing, leaving it out", entry.name());
                continue;
            };
            row.append(&module.widget());
        }
        row
    }

    pub fn widget(&self) -> &CenterBox {
        &self.root
    }
}
