// Path planning over weighted, time-varying grids

pub mod a_star;
pub mod cost_model;
pub mod grid_path;
pub mod planning_grid;

pub use a_star::*;
pub use cost_model::*;
pub use grid_path::*;
pub use planning_grid::*;
