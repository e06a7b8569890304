use ahash::AHashSet;
use compact_str::CompactString;
use serde_json::Value;

pub const CLICK_LEFT: u32 = 1;
const CLICK_MIDDLE: u32 = 2;
const CLICK_RIGHT: u32 = 3;
const CLICK_BACKWARD: u32 = 8;
const CLICK_FORWARD: u32 = 9;

/// Pointer button code for a `format-alt-click` value
pub fn click_button(value: Option<&Value>) -> u32 {
    match value.and_then(Value::as_str) {
        Some("click-middle" | "middle") => CLICK_MIDDLE,
        Some("click-right" | "right") => CLICK_RIGHT,
        Some("click-backward" | "backward" | "back") => CLICK_BACKWARD,
        Some("click-forward" | "forward") => CLICK_FORWARD,
        _ => CLICK_LEFT,
    }
}

/// Replace `format-alt-click` with its button code in every named module
/// fragment that declares `format-alt`, so modules only ever see numbers.
///
/// A fragment shared by several slots is converted once.
pub fn normalize_alt_click<'a>(raw: &mut Value, names: impl IntoIterator<Item = &'a CompactString>) {
    let mut seen = AHashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let Some(fragment) = raw.get_mut(name.as_str()).and_then(Value::as_object_mut) else {
            continue;
        };
        if !fragment.contains_key("format-alt") {
            continue;
        }
        let button = click_button(fragment.get("format-alt-click"));
        fragment.insert("format-alt-click".to_string(), Value::from(button));
    }
}
