//! Grid indexer: maps a buffered bounding rectangle onto square cells
//!
//! Cell `(x, y)` covers `[ox + x*s, ox + (x+1)*s) x [oy + y*s, oy + (y+1)*s)`
//! where `(ox, oy)` is the rectangle's min corner pushed out by `buffer`
//! cells and `s` is the square size. One extra row and column is always
//! added so the rectangle's max corner falls inside the grid.

use itertools::iproduct;
use log::debug;

use crate::common::{BoundingRect, GridCell, PlanningError, PlanningResult, Point2D};

/// Configuration for grid construction
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Cell edge length in the working frame
    pub square_size: f64,
    /// Extra cells added on every side of the bounding rectangle
    pub buffer: u32,
    /// Shift the grid so the start point sits at the centre of its cell
    pub snap_to_start: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            square_size: 1.0,
            buffer: 0,
            snap_to_start: false,
        }
    }
}

/// Square-cell index over a buffered bounding rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    bounds: BoundingRect,
    square_size: f64,
    buffer: u32,
    origin_x: f64,
    origin_y: f64,
    x_width: i32,
    y_width: i32,
}

impl GridMap {
    pub fn new(bounds: BoundingRect, buffer: u32, square_size: f64) -> PlanningResult<Self> {
        if !(square_size > 0.0) || !square_size.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "square size must be positive and finite, got {}",
                square_size
            )));
        }
        if !bounds.is_finite() || bounds.is_empty() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "bounding rectangle must be finite and non-empty, got {:?}",
                bounds
            )));
        }

        let x_width = Self::calc_width(bounds.width(), square_size, buffer)?;
        let y_width = Self::calc_width(bounds.height(), square_size, buffer)?;
        let origin_x = bounds.min_x - buffer as f64 * square_size;
        let origin_y = bounds.min_y - buffer as f64 * square_size;

        debug!(
            "grid map: {}x{} cells of size {} anchored at ({}, {})",
            x_width, y_width, square_size, origin_x, origin_y
        );

        Ok(GridMap {
            bounds,
            square_size,
            buffer,
            origin_x,
            origin_y,
            x_width,
            y_width,
        })
    }

    pub fn from_config(bounds: BoundingRect, config: &GridConfig) -> PlanningResult<Self> {
        Self::new(bounds, config.buffer, config.square_size)
    }

    fn calc_width(extent: f64, square_size: f64, buffer: u32) -> PlanningResult<i32> {
        let cells = (extent / square_size).ceil() + 2.0 * buffer as f64 + 1.0;
        if cells > i32::MAX as f64 {
            return Err(PlanningError::InvalidConfiguration(format!(
                "grid would need {} cells along one axis",
                cells
            )));
        }
        Ok(cells as i32)
    }

    /// Shift the grid origin so `anchor` lies at the centre of its cell
    ///
    /// A shift towards +x or +y would uncover the low edge of the buffered
    /// rectangle, so the grid grows by one cell on that side instead.
    pub fn snapped_to(mut self, anchor: Point2D) -> PlanningResult<Self> {
        let cell = self.cell_of(&anchor).ok_or(PlanningError::OutOfBounds {
            what: "snap anchor",
            point: anchor,
        })?;
        let center = self.position_of(cell);
        let dx = anchor.x - center.x;
        let dy = anchor.y - center.y;
        self.origin_x += dx;
        self.origin_y += dy;
        if dx > 0.0 {
            self.origin_x -= self.square_size;
            self.x_width += 1;
        }
        if dy > 0.0 {
            self.origin_y -= self.square_size;
            self.y_width += 1;
        }
        debug!(
            "grid map snapped to ({}, {}): {}x{} cells anchored at ({}, {})",
            anchor.x, anchor.y, self.x_width, self.y_width, self.origin_x, self.origin_y
        );
        Ok(self)
    }

    /// Cell containing `p`, or `None` outside the buffered grid
    pub fn cell_of(&self, p: &Point2D) -> Option<GridCell> {
        if !p.is_finite() {
            return None;
        }
        let fx = ((p.x - self.origin_x) / self.square_size).floor();
        let fy = ((p.y - self.origin_y) / self.square_size).floor();
        if fx < 0.0 || fy < 0.0 || fx >= self.x_width as f64 || fy >= self.y_width as f64 {
            return None;
        }
        Some(GridCell::new(fx as i32, fy as i32))
    }

    /// Centre of `cell`
    pub fn position_of(&self, cell: GridCell) -> Point2D {
        Point2D::new(
            self.origin_x + (cell.x as f64 + 0.5) * self.square_size,
            self.origin_y + (cell.y as f64 + 0.5) * self.square_size,
        )
    }

    /// Lower-left (min x, min y) corner of `cell`
    pub fn corner_of(&self, cell: GridCell) -> Point2D {
        Point2D::new(
            self.origin_x + cell.x as f64 * self.square_size,
            self.origin_y + cell.y as f64 * self.square_size,
        )
    }

    /// (width, height) in cells
    pub fn size(&self) -> (i32, i32) {
        (self.x_width, self.y_width)
    }

    pub fn x_width(&self) -> i32 {
        self.x_width
    }

    pub fn y_width(&self) -> i32 {
        self.y_width
    }

    pub fn square_size(&self) -> f64 {
        self.square_size
    }

    pub fn buffer(&self) -> u32 {
        self.buffer
    }

    /// The unbuffered rectangle the grid was built from
    pub fn bounds(&self) -> &BoundingRect {
        &self.bounds
    }

    /// The rectangle actually covered by cells
    pub fn extent(&self) -> BoundingRect {
        BoundingRect::new(
            self.origin_x,
            self.origin_y,
            self.origin_x + self.x_width as f64 * self.square_size,
            self.origin_y + self.y_width as f64 * self.square_size,
        )
    }

    pub fn is_inside(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.x_width && cell.y < self.y_width
    }

    /// Row-major flat index `y * width + x`
    pub fn calc_index(&self, cell: GridCell) -> Option<usize> {
        if !self.is_inside(cell) {
            return None;
        }
        Some(cell.y as usize * self.x_width as usize + cell.x as usize)
    }

    pub fn cell_count(&self) -> usize {
        self.x_width as usize * self.y_width as usize
    }

    /// Every cell, row by row from the bottom
    pub fn cells(&self) -> impl Iterator<Item = GridCell> {
        iproduct!(0..self.y_width, 0..self.x_width).map(|(y, x)| GridCell::new(x, y))
    }
}
