//! Avoidance and containment polygon groups for one planning query

use crate::common::Point2D;
use crate::hazard::moving_polygon::MovingPolygon;

/// Regions to stay out of and (optionally) regions to stay within
///
/// An empty containment group places no restriction.
#[derive(Debug, Clone, Default)]
pub struct HazardSet {
    avoid: Vec<MovingPolygon>,
    contain: Vec<MovingPolygon>,
}

impl HazardSet {
    pub fn new(avoid: Vec<MovingPolygon>, contain: Vec<MovingPolygon>) -> Self {
        Self { avoid, contain }
    }

    pub fn with_avoidance(avoid: Vec<MovingPolygon>) -> Self {
        Self::new(avoid, Vec::new())
    }

    pub fn add_avoidance(&mut self, poly: MovingPolygon) {
        self.avoid.push(poly);
    }

    pub fn add_containment(&mut self, poly: MovingPolygon) {
        self.contain.push(poly);
    }

    pub fn avoidance(&self) -> &[MovingPolygon] {
        &self.avoid
    }

    pub fn containment(&self) -> &[MovingPolygon] {
        &self.contain
    }

    pub fn is_empty(&self) -> bool {
        self.avoid.is_empty() && self.contain.is_empty()
    }

    pub fn requires_containment(&self) -> bool {
        !self.contain.is_empty()
    }

    /// Whether any avoidance polygon covers `point` at `time`
    pub fn is_blocked(&self, point: &Point2D, time: f64) -> bool {
        self.avoid.iter().any(|poly| poly.contains(point, time))
    }

    /// Whether `point` satisfies the containment group at `time`
    pub fn is_contained(&self, point: &Point2D, time: f64) -> bool {
        self.contain.is_empty() || self.contain.iter().any(|poly| poly.contains(point, time))
    }

    /// Whether the agent may occupy `point` at `time`
    pub fn permits(&self, point: &Point2D, time: f64) -> bool {
        !self.is_blocked(point, time) && self.is_contained(point, time)
    }
}
