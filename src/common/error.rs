//! Error types for grid_reroute

use thiserror::Error;

use crate::common::types::Point2D;

/// Main error type for grid construction and route search
///
/// Search exhaustion is not an error; it is reported as
/// [`SearchOutcome::NoPath`](crate::path_planning::SearchOutcome::NoPath).
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Grid or search configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A query point lies outside the buffered grid
    #[error("Out of bounds: {what} at ({x}, {y}) is outside the grid", x = .point.x, y = .point.y)]
    OutOfBounds { what: &'static str, point: Point2D },
    /// Malformed hazard or containment polygon
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
