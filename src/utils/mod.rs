//! Utility modules for grid_reroute

pub mod grid_map;
pub mod weight_map;
pub mod polygon;

pub use grid_map::*;
pub use weight_map::*;
pub use polygon::*;
