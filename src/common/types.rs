//! Common types used throughout grid_reroute

use nalgebra::Vector2;

/// 2D point in the working (Euclidean) frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Point displaced by `v * dt`
    pub fn translate(&self, v: &Vector2<f64>, dt: f64) -> Point2D {
        Point2D::new(self.x + v[0] * dt, self.y + v[1] * dt)
    }

    /// Linear interpolation, `frac = 0` gives `self`
    pub fn interpolate(&self, other: &Point2D, frac: f64) -> Point2D {
        Point2D::new(
            self.x + (other.x - self.x) * frac,
            self.y + (other.y - self.y) * frac,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// A point with an absolute time stamp (trajectory sample or waypoint)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub position: Point2D,
    pub time: f64,
}

impl TimedPoint {
    pub fn new(position: Point2D, time: f64) -> Self {
        Self { position, time }
    }
}

/// Integer coordinate of one square cell of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> GridCell {
        GridCell::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance, the step count of an 8-connected move sequence
    pub fn chebyshev(&self, other: &GridCell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Manhattan distance, the step count of a 4-connected move sequence
    pub fn manhattan(&self, other: &GridCell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance measured in cells
    pub fn euclidean(&self, other: &GridCell) -> f64 {
        (((self.x - other.x).pow(2) + (self.y - other.y).pow(2)) as f64).sqrt()
    }
}

impl From<(i32, i32)> for GridCell {
    fn from(tuple: (i32, i32)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

/// Axis-aligned rectangle in the working frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Empty rectangle; `add` grows it to include points
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2D>,
    {
        let mut rect = Self::empty();
        for p in points {
            rect.add(p);
        }
        rect
    }

    pub fn add(&mut self, p: &Point2D) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Closed containment test
    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Rectangle shifted by `(dx, dy)`
    pub fn shifted(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.min_x + dx, self.min_y + dy, self.max_x + dx, self.max_y + dy)
    }
}
