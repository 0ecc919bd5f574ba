//! Static polygon primitives: containment and closest-point queries

use itertools::Itertools;

use crate::common::{BoundingRect, Point2D};

/// Simple polygon given by its vertices in order (either winding)
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2D>,
    bbox: BoundingRect,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2D>) -> Self {
        let bbox = BoundingRect::from_points(vertices.iter());
        Self { vertices, bbox }
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounding_rect(&self) -> &BoundingRect {
        &self.bbox
    }

    /// Even-odd (crossing number) point-in-polygon test
    ///
    /// Points exactly on an edge may fall on either side.
    pub fn contains(&self, p: &Point2D) -> bool {
        if self.vertices.len() < 3 || !self.bbox.contains(p) {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.vertices.iter().circular_tuple_windows() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Closest point on the polygon boundary to `p`
    pub fn closest_boundary_point(&self, p: &Point2D) -> Option<Point2D> {
        self.vertices
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| closest_point_on_segment(a, b, p))
            .min_by(|u, v| u.distance(p).total_cmp(&v.distance(p)))
    }

    pub fn centroid(&self) -> Option<Point2D> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
        Some(Point2D::new(sx / n, sy / n))
    }
}

/// Closest point to `p` on the segment `a`-`b`
pub fn closest_point_on_segment(a: &Point2D, b: &Point2D, p: &Point2D) -> Point2D {
    let ab = b.to_vector() - a.to_vector();
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((p.to_vector() - a.to_vector()).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a.interpolate(b, t)
}
