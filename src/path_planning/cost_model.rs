//! Time-aware cost functions built by wrapping simpler ones
//!
//! The base layer is a [`WeightMap`]. [`HazardCost`] makes cells
//! impassable while an avoidance polygon covers their centre (or while
//! no containment polygon does), and [`LookaheadCost`] frees every cell
//! beyond a time horizon.

use crate::common::{CostFunction, GridCell};
use crate::hazard::HazardSet;
use crate::utils::{GridMap, WeightMap};

/// Applies avoidance and containment polygons on top of `inner`
#[derive(Debug, Clone)]
pub struct HazardCost<'a, C> {
    inner: C,
    grid: &'a GridMap,
    hazards: &'a HazardSet,
}

impl<'a, C: CostFunction> HazardCost<'a, C> {
    pub fn new(inner: C, grid: &'a GridMap, hazards: &'a HazardSet) -> Self {
        Self { inner, grid, hazards }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<'a, C: CostFunction> CostFunction for HazardCost<'a, C> {
    fn cost(&self, cell: GridCell, time: f64) -> f64 {
        let base = self.inner.cost(cell, time);
        if base == f64::INFINITY || self.hazards.is_empty() {
            return base;
        }
        let center = self.grid.position_of(cell);
        if self.hazards.is_blocked(&center, time) {
            return f64::INFINITY;
        }
        if !self.hazards.is_contained(&center, time) {
            return f64::INFINITY;
        }
        base
    }

    fn lower_bound(&self) -> f64 {
        self.inner.lower_bound()
    }
}

/// Zero cost for any time past `cutoff`
///
/// Paths are therefore optimal only up to the horizon; everything after
/// it is treated as free.
#[derive(Debug, Clone)]
pub struct LookaheadCost<C> {
    inner: C,
    cutoff: Option<f64>,
}

impl<C: CostFunction> LookaheadCost<C> {
    pub fn new(inner: C, cutoff: Option<f64>) -> Self {
        Self { inner, cutoff }
    }

    pub fn cutoff(&self) -> Option<f64> {
        self.cutoff
    }
}

impl<C: CostFunction> CostFunction for LookaheadCost<C> {
    fn cost(&self, cell: GridCell, time: f64) -> f64 {
        match self.cutoff {
            Some(cutoff) if time > cutoff => 0.0,
            _ => self.inner.cost(cell, time),
        }
    }

    fn lower_bound(&self) -> f64 {
        if self.cutoff.is_some() {
            0.0
        } else {
            self.inner.lower_bound()
        }
    }
}

/// The full timed cost stack: weights, then hazards, then lookahead
pub type TimedCost<'a> = LookaheadCost<HazardCost<'a, &'a WeightMap>>;

pub fn timed_cost<'a>(
    grid: &'a GridMap,
    weights: &'a WeightMap,
    hazards: &'a HazardSet,
    lookahead: Option<f64>,
) -> TimedCost<'a> {
    LookaheadCost::new(HazardCost::new(weights, grid, hazards), lookahead)
}
