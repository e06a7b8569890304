use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::warn;

/// Screen edge the bar is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl Position {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Position::Left | Position::Right)
    }

    /// Resolve the `position` config key, falling back to `Top`
    pub fn from_config(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            None | Some("top") => Position::Top,
            Some("bottom") => Position::Bottom,
            Some("left") => Position::Left,
            Some("right") => Position::Right,
            Some(other) => {
                warn!("Unknown bar position {:?}, using top", other);
                Position::Top
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Bottom => "bottom",
            Position::Left => "left",
            Position::Right => "right",
        }
    }

    pub fn edge(&self) -> Edge {
        match self {
            Position::Top => Edge::Top,
            Position::Bottom => Edge::Bottom,
            Position::Left => Edge::Left,
            Position::Right => Edge::Right,
        }
    }
}

/// One side of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Bit value used by `zwlr_layer_surface_v1.set_anchor`
    pub const fn bit(self) -> u32 {
        match self {
            Edge::Top => 1,
            Edge::Bottom => 2,
            Edge::Left => 4,
            Edge::Right => 8,
        }
    }
}

/// Set of anchored edges, stored as the layer-shell bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor(u32);

impl Anchor {
    pub const TOP: Anchor = Anchor(Edge::Top.bit());
    pub const BOTTOM: Anchor = Anchor(Edge::Bottom.bit());
    pub const LEFT: Anchor = Anchor(Edge::Left.bit());
    pub const RIGHT: Anchor = Anchor(Edge::Right.bit());

    /// Anchor for a bar docked at `position`: the primary edge plus both
    /// perpendicular edges, so the bar spans the whole side.
    pub fn for_position(position: Position) -> Self {
        match position {
            Position::Top => Self::TOP | Self::LEFT | Self::RIGHT,
            Position::Bottom => Self::BOTTOM | Self::LEFT | Self::RIGHT,
            Position::Left => Self::LEFT | Self::TOP | Self::BOTTOM,
            Position::Right => Self::RIGHT | Self::TOP | Self::BOTTOM,
        }
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, edge: Edge) -> bool {
        self.0 & edge.bit() != 0
    }

    pub fn edges(self) -> SmallVec<[Edge; 4]> {
        Edge::ALL.into_iter().filter(|e| self.contains(*e)).collect()
    }

    /// Edge whose opposite is not anchored, if there is exactly one
    pub fn primary(self) -> Option<Position> {
        let top = self.contains(Edge::Top);
        let bottom = self.contains(Edge::Bottom);
        let left = self.contains(Edge::Left);
        let right = self.contains(Edge::Right);

        match (top, bottom, left, right) {
            (true, false, _, _) if left == right => Some(Position::Top),
            (false, true, _, _) if left == right => Some(Position::Bottom),
            (_, _, true, false) if top == bottom => Some(Position::Left),
            (_, _, false, true) if top == bottom => Some(Position::Right),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        self.primary().map(|p| p.is_vertical()).unwrap_or(false)
    }
}

impl std::ops::BitOr for Anchor {
    type Output = Anchor;

    fn bitor(self, rhs: Anchor) -> Anchor {
        Anchor(self.0 | rhs.0)
    }
}

/// Layer-shell stacking layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Top,
    #[default]
    Bottom,
}

impl Layer {
    /// Only the exact string `"top"` selects the top layer
    pub fn from_config(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("top") => Layer::Top,
            _ => Layer::Bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anchor_spans_perpendicular_axis() {
        for position in [Position::Top, Position::Bottom, Position::Left, Position::Right] {
            let anchor = Anchor::for_position(position);
            assert_eq!(anchor.edges().len(), 3, "{position:?}");
            assert!(anchor.contains(position.edge()));
            assert_eq!(anchor.primary(), Some(position));
            assert_eq!(anchor.is_vertical(), position.is_vertical());
        }

        assert_eq!(Anchor::for_position(Position::Top).bits(), 1 | 4 | 8);
        assert_eq!(Anchor::for_position(Position::Left).bits(), 4 | 1 | 2);
    }

    #[test]
    fn test_position_from_config() {
        assert_eq!(Position::from_config(None), Position::Top);
        assert_eq!(Position::from_config(Some(&json!("bottom"))), Position::Bottom);
        assert_eq!(Position::from_config(Some(&json!("right"))), Position::Right);
        assert_eq!(Position::from_config(Some(&json!("diagonal"))), Position::Top);
        assert_eq!(Position::from_config(Some(&json!(3))), Position::Top);
    }

    #[test]
    fn test_layer_defaults_to_bottom() {
        assert_eq!(Layer::from_config(None), Layer::Bottom);
        assert_eq!(Layer::from_config(Some(&json!("top"))), Layer::Top);
        assert_eq!(Layer::from_config(Some(&json!("overlay"))), Layer::Bottom);
    }
}
