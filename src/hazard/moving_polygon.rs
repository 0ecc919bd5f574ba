//! Time-parameterized polygons whose vertices translate at constant velocity
//!
//! A polygon's shape at absolute time `t` is obtained by moving every
//! vertex by `velocity * dt`, where `dt = t - epoch` is clamped into
//! `[0, duration]`. Vertices may move at different velocities, so the
//! polygon can deform over time.

use nalgebra::Vector2;

use crate::common::{BoundingRect, PlanningError, PlanningResult, Point2D};
use crate::utils::Polygon;

/// One polygon vertex with its own constant velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingVertex {
    pub position: Point2D,
    pub velocity: Vector2<f64>,
}

impl MovingVertex {
    pub fn new(position: Point2D, velocity: Vector2<f64>) -> Self {
        Self { position, velocity }
    }

    pub fn stationary(position: Point2D) -> Self {
        Self::new(position, Vector2::zeros())
    }

    pub fn position_at(&self, dt: f64) -> Point2D {
        self.position.translate(&self.velocity, dt)
    }
}

/// Polygon whose vertices drift at constant velocity for a bounded time
#[derive(Debug, Clone, PartialEq)]
pub struct MovingPolygon {
    vertices: Vec<MovingVertex>,
    epoch: f64,
    duration: f64,
    // Shape at `epoch`
    base: Polygon,
    // Shared velocity when every vertex moves together
    rigid_velocity: Option<Vector2<f64>>,
}

impl MovingPolygon {
    /// Polygon whose vertex positions are valid at `epoch` and which
    /// may be extrapolated for `duration` seconds
    pub fn new(vertices: Vec<MovingVertex>, epoch: f64, duration: f64) -> PlanningResult<Self> {
        if vertices.len() < 3 {
            return Err(PlanningError::InvalidPolygon(format!(
                "a polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if duration.is_nan() || duration < 0.0 {
            return Err(PlanningError::InvalidPolygon(format!(
                "duration must be non-negative, got {}",
                duration
            )));
        }
        if !epoch.is_finite() {
            return Err(PlanningError::InvalidPolygon(format!("epoch must be finite, got {}", epoch)));
        }
        let finite = vertices.iter().all(|v| {
            v.position.is_finite() && v.velocity.iter().all(|c| c.is_finite())
        });
        if !finite {
            return Err(PlanningError::InvalidPolygon(
                "vertex positions and velocities must be finite".to_string(),
            ));
        }

        let first = vertices[0].velocity;
        let rigid_velocity = if vertices.iter().all(|v| v.velocity == first) {
            Some(first)
        } else {
            None
        };
        let base = Polygon::new(vertices.iter().map(|v| v.position).collect());

        Ok(Self {
            vertices,
            epoch,
            duration,
            base,
            rigid_velocity,
        })
    }

    /// Rigid polygon translating with a single velocity
    pub fn translating(
        points: Vec<Point2D>,
        velocity: Vector2<f64>,
        epoch: f64,
        duration: f64,
    ) -> PlanningResult<Self> {
        let vertices = points
            .into_iter()
            .map(|p| MovingVertex::new(p, velocity))
            .collect();
        Self::new(vertices, epoch, duration)
    }

    /// Polygon that never moves and never expires
    pub fn fixed(points: Vec<Point2D>) -> PlanningResult<Self> {
        Self::translating(points, Vector2::zeros(), 0.0, f64::INFINITY)
    }

    pub fn vertices(&self) -> &[MovingVertex] {
        &self.vertices
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// True when all vertices share one velocity (rigid translation)
    ///
    /// Computed once at construction.
    pub fn is_stable(&self) -> bool {
        self.rigid_velocity.is_some()
    }

    /// True when the polygon does not move at all
    pub fn is_static(&self) -> bool {
        matches!(self.rigid_velocity, Some(v) if v == Vector2::zeros())
    }

    /// Elapsed time since `epoch`, clamped into `[0, duration]`
    fn elapsed(&self, time: f64) -> f64 {
        (time - self.epoch).clamp(0.0, self.duration)
    }

    /// The polygon's shape at absolute `time`
    pub fn positions_at(&self, time: f64) -> Polygon {
        let dt = self.elapsed(time);
        Polygon::new(self.vertices.iter().map(|v| v.position_at(dt)).collect())
    }

    /// Axis-aligned bounds of the shape at `time`
    pub fn bounding_rect_at(&self, time: f64) -> BoundingRect {
        let dt = self.elapsed(time);
        match self.rigid_velocity {
            Some(v) => self.base.bounding_rect().shifted(v[0] * dt, v[1] * dt),
            None => BoundingRect::from_points(
                self.vertices.iter().map(|v| v.position_at(dt)).collect::<Vec<_>>().iter(),
            ),
        }
    }

    /// Whether `point` lies inside the shape at absolute `time`
    pub fn contains(&self, point: &Point2D, time: f64) -> bool {
        let dt = self.elapsed(time);
        match self.rigid_velocity {
            // Move the query point backwards instead of the polygon forwards
            Some(v) => self.base.contains(&point.translate(&v, -dt)),
            None => self.positions_at(time).contains(point),
        }
    }
}
