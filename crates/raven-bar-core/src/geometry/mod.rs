mod anchor;
mod engine;
mod margins;

pub use anchor::{Anchor, Edge, Layer, Position};
pub use engine::{
    exclusive_zone, reconcile, requested_surface_size, Axis, FixedAxes, Geometry, SurfaceSize,
    AUTO_SIZE,
};
pub use margins::Margins;
