//! grid_reroute - time-aware grid route search around moving hazards
//!
//! This crate discretises a planar region into square cells, attaches a
//! static traversal weight to each cell, overlays moving avoidance and
//! containment polygons, and finds minimum-cost routes with A*, either
//! over a frozen cost field or with the clock advancing as the agent flies.

// Core modules
pub mod common;
pub mod utils;

// Hazards and search
pub mod hazard;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{BoundingRect, GridCell, Point2D, TimedPoint};
pub use common::{CostFunction, StaticGridSearch, TimedGridSearch};
pub use common::{PlanningError, PlanningResult};
pub use hazard::{HazardSet, MovingPolygon, MovingVertex};
pub use path_planning::{AStarSearch, GridPath, PlanningGrid, SearchConfig, SearchOutcome};
pub use utils::{GridConfig, GridMap, WeightMap};
