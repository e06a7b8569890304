use serde_json::Value;
use tracing::warn;

use crate::error::ConfigError;

const EDGE_KEYS: [&str; 4] = ["margin-top", "margin-right", "margin-bottom", "margin-left"];

/// Margins around the layer surface, in `set_margin` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Margins {
    pub const fn uniform(value: i32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Resolve margins from a bar config object.
    ///
    /// Per-edge integer keys win over the `margin` key. A string `margin` is
    /// parsed as CSS-like shorthand, an integer `margin` applies to all edges.
    /// Malformed shorthand is reported and leaves the margins at zero.
    pub fn from_config(config: &Value) -> Self {
        let edges: Vec<Option<i32>> = EDGE_KEYS
            .iter()
            .map(|key| config.get(*key).and_then(as_i32))
            .collect();

        if edges.iter().any(Option::is_some) {
            return Self {
                top: edges[0].unwrap_or(0),
                right: edges[1].unwrap_or(0),
                bottom: edges[2].unwrap_or(0),
                left: edges[3].unwrap_or(0),
            };
        }

        match config.get("margin") {
            Some(Value::String(shorthand)) => match Self::parse_shorthand(shorthand) {
                Ok(margins) => margins,
                Err(e) => {
                    warn!("{}", e);
                    Self::default()
                }
            },
            Some(value) => as_i32(value).map(Self::uniform).unwrap_or_default(),
            None => Self::default(),
        }
    }

    /// Parse `"a"`, `"v h"`, `"t h b"` or `"t r b l"`
    pub fn parse_shorthand(shorthand: &str) -> Result<Self, ConfigError> {
        let values = shorthand
            .split_whitespace()
            .map(str::parse::<i32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::InvalidMargins(shorthand.to_string()))?;

        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(ConfigError::InvalidMargins(shorthand.to_string())),
        }
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|v| i32::try_from(v).ok())
}
