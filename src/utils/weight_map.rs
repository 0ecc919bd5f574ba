//! Static weight field: base traversal cost per cell
//!
//! A cell without a stored weight is outside the known region and is
//! impassable. Storage is a flat row-major array sized to the grid.

use log::warn;

use crate::common::{CostFunction, GridCell, PlanningError, PlanningResult};
use crate::utils::grid_map::GridMap;
use crate::utils::polygon::Polygon;

/// Per-cell traversal weights; a cell without one is impassable
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMap {
    x_width: i32,
    y_width: i32,
    weights: Vec<Option<f64>>,
}

impl WeightMap {
    /// Empty field (every cell unknown) matching the grid's extent
    pub fn new(grid: &GridMap) -> Self {
        Self {
            x_width: grid.x_width(),
            y_width: grid.y_width(),
            weights: vec![None; grid.cell_count()],
        }
    }

    /// Field with every cell set to `weight`
    pub fn uniform(grid: &GridMap, weight: f64) -> PlanningResult<Self> {
        let mut map = Self::new(grid);
        map.fill(weight)?;
        Ok(map)
    }

    fn calc_index(&self, cell: GridCell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.x_width || cell.y >= self.y_width {
            return None;
        }
        Some(cell.y as usize * self.x_width as usize + cell.x as usize)
    }

    fn check_weight(weight: f64) -> PlanningResult<()> {
        if weight.is_nan() || weight < 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "weight must be non-negative, got {}",
                weight
            )));
        }
        Ok(())
    }

    /// Stored weight, or `None` for cells outside the known region
    pub fn get(&self, cell: GridCell) -> Option<f64> {
        self.calc_index(cell).and_then(|i| self.weights[i])
    }

    /// Stored weight, `f64::INFINITY` when unknown or off the grid
    pub fn weight(&self, cell: GridCell) -> f64 {
        self.get(cell).unwrap_or(f64::INFINITY)
    }

    pub fn is_known(&self, cell: GridCell) -> bool {
        self.get(cell).is_some()
    }

    pub fn set_weight(&mut self, cell: GridCell, weight: f64) -> PlanningResult<()> {
        Self::check_weight(weight)?;
        let index = self.calc_index(cell).ok_or_else(|| {
            PlanningError::InvalidParameter(format!("cell ({}, {}) is off the grid", cell.x, cell.y))
        })?;
        self.weights[index] = Some(weight);
        Ok(())
    }

    /// Forget the weight of `cell`, making it impassable
    pub fn clear_weight(&mut self, cell: GridCell) {
        if let Some(index) = self.calc_index(cell) {
            self.weights[index] = None;
        }
    }

    pub fn clear(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = None);
    }

    /// Set every cell to `weight`
    pub fn fill(&mut self, weight: f64) -> PlanningResult<()> {
        Self::check_weight(weight)?;
        self.weights.iter_mut().for_each(|w| *w = Some(weight));
        Ok(())
    }

    /// Set every cell in the inclusive rectangle `min..=max`, clipped to the grid
    pub fn set_weights_in(&mut self, min: GridCell, max: GridCell, weight: f64) -> PlanningResult<()> {
        Self::check_weight(weight)?;
        for y in min.y.max(0)..=max.y.min(self.y_width - 1) {
            for x in min.x.max(0)..=max.x.min(self.x_width - 1) {
                if let Some(index) = self.calc_index(GridCell::new(x, y)) {
                    self.weights[index] = Some(weight);
                }
            }
        }
        Ok(())
    }

    /// Set the weight of every cell whose centre lies inside `poly`
    pub fn set_weights_inside(&mut self, grid: &GridMap, poly: &Polygon, weight: f64) -> PlanningResult<()> {
        Self::check_weight(weight)?;
        for cell in grid.cells() {
            if poly.contains(&grid.position_of(cell)) {
                if let Some(index) = self.calc_index(cell) {
                    self.weights[index] = Some(weight);
                }
            }
        }
        Ok(())
    }

    /// Clear the weight of every cell whose centre lies outside `poly`
    pub fn clear_weights_outside(&mut self, grid: &GridMap, poly: &Polygon) {
        for cell in grid.cells() {
            if !poly.contains(&grid.position_of(cell)) {
                self.clear_weight(cell);
            }
        }
    }

    /// Weight cells by their distance (in cells) to the nearest cell of `path`
    ///
    /// Cells on the path get 0 and the weight grows by `factor` per cell of
    /// distance. Unless `apply_to_undefined` is set, only cells that already
    /// carry a weight are updated.
    pub fn set_proximity_weights(
        &mut self,
        path: &[GridCell],
        factor: f64,
        apply_to_undefined: bool,
    ) -> PlanningResult<()> {
        Self::check_weight(factor)?;
        if path.is_empty() {
            return Ok(());
        }
        for y in 0..self.y_width {
            for x in 0..self.x_width {
                let cell = GridCell::new(x, y);
                let index = cell.y as usize * self.x_width as usize + cell.x as usize;
                if !apply_to_undefined && self.weights[index].is_none() {
                    continue;
                }
                let dist = path
                    .iter()
                    .map(|p| p.euclidean(&cell))
                    .fold(f64::INFINITY, f64::min);
                self.weights[index] = Some(dist * factor);
            }
        }
        Ok(())
    }

    /// Smallest stored weight, or `None` when no cell is known
    pub fn min_weight(&self) -> Option<f64> {
        self.weights.iter().flatten().copied().reduce(f64::min)
    }

    pub fn max_weight(&self) -> Option<f64> {
        self.weights.iter().flatten().copied().reduce(f64::max)
    }

    pub fn known_count(&self) -> usize {
        self.weights.iter().filter(|w| w.is_some()).count()
    }

    /// Known cells with their weights
    pub fn iter(&self) -> impl Iterator<Item = (GridCell, f64)> + '_ {
        let width = self.x_width as usize;
        self.weights.iter().enumerate().filter_map(move |(i, w)| {
            w.map(|w| (GridCell::new((i % width) as i32, (i / width) as i32), w))
        })
    }
}

/// The field on its own is a time-invariant cost function
impl CostFunction for WeightMap {
    fn cost(&self, cell: GridCell, _time: f64) -> f64 {
        self.weight(cell)
    }

    fn lower_bound(&self) -> f64 {
        let finite_min = self
            .weights
            .iter()
            .flatten()
            .copied()
            .filter(|w| w.is_finite())
            .reduce(f64::min);
        match finite_min {
            Some(w) => w,
            None => {
                warn!("weight map has no known cells");
                0.0
            }
        }
    }
}
