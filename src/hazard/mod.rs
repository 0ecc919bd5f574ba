//! Moving hazard model: translating/deforming polygons over time

pub mod moving_polygon;
pub mod hazard_set;

pub use moving_polygon::*;
pub use hazard_set::*;
