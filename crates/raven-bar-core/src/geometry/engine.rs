use std::fmt;

use tracing::{debug, info, warn};

use super::{Anchor, Edge, Margins, Position};
use crate::config::BarConfig;

/// Size value meaning "let the content decide" on that axis
pub const AUTO_SIZE: u32 = 1;

/// Surface size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Default for a bar: stretch along the docked side, automatic thickness
    pub fn default_for(position: Position) -> Self {
        if position.is_vertical() {
            Self::new(AUTO_SIZE, 0)
        } else {
            Self::new(0, AUTO_SIZE)
        }
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: u32| {
            if v == AUTO_SIZE {
                "auto".to_string()
            } else {
                v.to_string()
            }
        };
        write!(f, "{}x{}", show(self.width), show(self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("Width"),
            Axis::Height => f.write_str("Height"),
        }
    }
}

/// Axes whose size was set explicitly in the config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedAxes {
    pub width: bool,
    pub height: bool,
}

/// Space the compositor should reserve for the bar.
///
/// The compositor already accounts for the margin on the anchored edge, so
/// only the margin on the opposite edge is added to the bar thickness.
pub fn exclusive_zone(visible: bool, anchor: Anchor, margins: &Margins, size: SurfaceSize) -> u32 {
    if !visible {
        return 0;
    }

    let zone = if anchor.is_vertical() {
        let opposite = if anchor.contains(Edge::Left) {
            margins.right
        } else {
            margins.left
        };
        i64::from(size.width) + i64::from(opposite)
    } else {
        let opposite = if anchor.contains(Edge::Top) {
            margins.bottom
        } else {
            margins.top
        };
        i64::from(size.height) + i64::from(opposite)
    };

    u32::try_from(zone.max(0)).unwrap_or(u32::MAX)
}

/// Size to pass to `set_size`.
///
/// When anchored to two opposite edges, sway reports the configured size
/// without margins on that axis but expects `set_size` to include them.
/// This is observed compositor behavior, not something wlr-layer-shell
/// specifies.
pub fn requested_surface_size(size: SurfaceSize, vertical: bool, margins: &Margins) -> SurfaceSize {
    let mut requested = size;
    if vertical && size.height > AUTO_SIZE {
        requested.height = add_margins(size.height, margins.top, margins.bottom);
    }
    if !vertical && size.width > AUTO_SIZE {
        requested.width = add_margins(size.width, margins.right, margins.left);
    }
    requested
}

fn add_margins(value: u32, a: i32, b: i32) -> u32 {
    let total = i64::from(value) + i64::from(a) + i64::from(b);
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}

/// Merge a compositor size proposal with the current size.
///
/// Axes fixed in the config keep their value; automatic axes follow the
/// compositor.
pub fn reconcile(current: SurfaceSize, proposed: SurfaceSize, fixed: FixedAxes) -> SurfaceSize {
    SurfaceSize {
        width: reconcile_axis(Axis::Width, current.width, proposed.width, fixed.width),
        height: reconcile_axis(Axis::Height, current.height, proposed.height, fixed.height),
    }
}

fn reconcile_axis(axis: Axis, current: u32, proposed: u32, fixed: bool) -> u32 {
    if proposed > current {
        if current > AUTO_SIZE {
            warn!(
                "Requested {} {} is smaller than the {} required by the modules",
                axis.to_string().to_lowercase(),
                current,
                proposed
            );
        }
        if fixed {
            info!("{} is set in the config, keeping {}", axis, current);
            return current;
        }
    }

    if fixed {
        current
    } else {
        proposed
    }
}

/// Geometry state of a single bar
#[derive(Debug, Clone)]
pub struct Geometry {
    pub position: Position,
    pub anchor: Anchor,
    pub margins: Margins,
    pub size: SurfaceSize,
    pub fixed: FixedAxes,
    pub visible: bool,
}

impl Geometry {
    pub fn from_config(config: &BarConfig) -> Self {
        let position = config.position;
        let mut size = SurfaceSize::default_for(position);
        if let Some(width) = config.width {
            size.width = width;
        }
        if let Some(height) = config.height {
            size.height = height;
        }

        Self {
            position,
            anchor: Anchor::for_position(position),
            margins: config.margins,
            size,
            fixed: FixedAxes {
                width: config.width.is_some(),
                height: config.height.is_some(),
            },
            visible: true,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.position.is_vertical()
    }

    pub fn exclusive_zone(&self) -> u32 {
        exclusive_zone(self.visible, self.anchor, &self.margins, self.size)
    }

    pub fn requested_size(&self) -> SurfaceSize {
        requested_surface_size(self.size, self.is_vertical(), &self.margins)
    }

    pub fn reconcile(&self, proposed: SurfaceSize) -> SurfaceSize {
        reconcile(self.size, proposed, self.fixed)
    }

    /// Both axes are larger than the automatic sentinel
    pub fn has_explicit_size(&self) -> bool {
        self.size.width > AUTO_SIZE && self.size.height > AUTO_SIZE
    }

    /// Flip visibility and return the new state
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        debug!("Bar visibility now {}", self.visible);
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn margins(top: i32, right: i32, bottom: i32, left: i32) -> Margins {
        Margins { top, right, bottom, left }
    }

    #[test]
    fn test_exclusive_zone_hidden_is_zero() {
        for position in [Position::Top, Position::Bottom, Position::Left, Position::Right] {
            let anchor = Anchor::for_position(position);
            let zone = exclusive_zone(false, anchor, &margins(9, 9, 9, 9), SurfaceSize::new(40, 40));
            assert_eq!(zone, 0);
        }
    }

    #[test]
    fn test_exclusive_zone_adds_opposite_margin() {
        let m = margins(5, 11, 7, 13);
        let size = SurfaceSize::new(20, 30);

        assert_eq!(exclusive_zone(true, Anchor::for_position(Position::Top), &m, size), 37);
        assert_eq!(exclusive_zone(true, Anchor::for_position(Position::Bottom), &m, size), 35);
        assert_eq!(exclusive_zone(true, Anchor::for_position(Position::Left), &m, size), 31);
        assert_eq!(exclusive_zone(true, Anchor::for_position(Position::Right), &m, size), 33);
    }

    #[test]
    fn test_exclusive_zone_never_negative() {
        let zone = exclusive_zone(
            true,
            Anchor::for_position(Position::Top),
            &margins(0, 0, -50, 0),
            SurfaceSize::new(0, 30),
        );
        assert_eq!(zone, 0);
    }

    #[test]
    fn test_requested_size_vertical_adds_vertical_margins() {
        let m = margins(4, 3, 6, 2);
        let requested = requested_surface_size(SurfaceSize::new(30, 100), true, &m);
        assert_eq!(requested, SurfaceSize::new(30, 110));
    }

    #[test]
    fn test_requested_size_horizontal_adds_horizontal_margins() {
        let m = margins(4, 3, 6, 2);
        let requested = requested_surface_size(SurfaceSize::new(800, 30), false, &m);
        assert_eq!(requested, SurfaceSize::new(805, 30));
    }

    #[test]
    fn test_requested_size_skips_auto_axes() {
        let m = margins(4, 3, 6, 2);
        assert_eq!(
            requested_surface_size(SurfaceSize::new(0, AUTO_SIZE), false, &m),
            SurfaceSize::new(0, AUTO_SIZE)
        );
        assert_eq!(
            requested_surface_size(SurfaceSize::new(AUTO_SIZE, 0), true, &m),
            SurfaceSize::new(AUTO_SIZE, 0)
        );
    }

    #[test]
    #[traced_test]
    fn test_reconcile_keeps_fixed_width() {
        let fixed = FixedAxes { width: true, height: false };
        let effective = reconcile(SurfaceSize::new(200, 1), SurfaceSize::new(500, 30), fixed);
        assert_eq!(effective, SurfaceSize::new(200, 30));
        assert!(logs_contain("Width is set in the config, keeping 200"));
        assert!(logs_contain(
            "Requested width 200 is smaller than the 500 required by the modules"
        ));
        // Growing from the automatic sentinel is not a violation
        assert!(!logs_contain("Requested height"));
    }

    #[test]
    #[traced_test]
    fn test_reconcile_auto_axes_follow_compositor() {
        let effective = reconcile(
            SurfaceSize::new(0, AUTO_SIZE),
            SurfaceSize::new(1920, 26),
            FixedAxes::default(),
        );
        assert_eq!(effective, SurfaceSize::new(1920, 26));

        let shrunk = reconcile(effective, SurfaceSize::new(1280, 26), FixedAxes::default());
        assert_eq!(shrunk, SurfaceSize::new(1280, 26));
        assert!(!logs_contain("Requested"));

        let grown = reconcile(shrunk, SurfaceSize::new(2560, 26), FixedAxes::default());
        assert_eq!(grown, SurfaceSize::new(2560, 26));
        assert!(logs_contain(
            "Requested width 1280 is smaller than the 2560 required by the modules"
        ));
        assert!(!logs_contain("is set in the config"));
    }

    #[test]
    fn test_geometry_defaults_by_orientation() {
        let top = BarConfig::resolve(&json!({})).unwrap();
        let geometry = Geometry::from_config(&top);
        assert_eq!(geometry.size, SurfaceSize::new(0, AUTO_SIZE));
        assert!(!geometry.is_vertical());

        let left = BarConfig::resolve(&json!({ "position": "left" })).unwrap();
        let geometry = Geometry::from_config(&left);
        assert_eq!(geometry.size, SurfaceSize::new(AUTO_SIZE, 0));
        assert!(geometry.is_vertical());
        assert_eq!(geometry.anchor, Anchor::LEFT | Anchor::TOP | Anchor::BOTTOM);
    }

    #[test]
    fn test_geometry_explicit_size() {
        let config = BarConfig::resolve(&json!({ "height": 30, "width": 1200 })).unwrap();
        let geometry = Geometry::from_config(&config);
        assert_eq!(geometry.size, SurfaceSize::new(1200, 30));
        assert!(geometry.fixed.width && geometry.fixed.height);
        assert!(geometry.has_explicit_size());
    }

    #[test]
    fn test_toggle_twice_restores_zone() {
        let config =
            BarConfig::resolve(&json!({ "height": 30, "margin": "5 0 7 0" })).unwrap();
        let mut geometry = Geometry::from_config(&config);
        let before = geometry.exclusive_zone();
        assert_eq!(before, 37);

        assert!(!geometry.toggle());
        assert_eq!(geometry.exclusive_zone(), 0);
        assert!(geometry.toggle());

        assert_eq!(geometry.exclusive_zone(), before);
        assert_eq!(geometry.margins, margins(5, 0, 7, 0));
        assert_eq!(geometry.size, SurfaceSize::new(0, 30));
    }

    #[test]
    fn test_size_display_marks_auto() {
        assert_eq!(SurfaceSize::new(AUTO_SIZE, 40).to_string(), "autox40");
        assert_eq!(SurfaceSize::new(1920, 26).to_string(), "1920x26");
    }
}
