//! Common traits defining the seams between cost models and search

use crate::common::error::PlanningResult;
use crate::common::types::GridCell;
use crate::path_planning::SearchOutcome;
use crate::utils::GridMap;

/// Effective traversal cost of a cell at an absolute time
///
/// `f64::INFINITY` marks the cell impassable at that time. Implementations
/// must be pure: the search may query the same `(cell, time)` pair any
/// number of times and in any order.
pub trait CostFunction {
    /// Cost of entering `cell` at `time`
    fn cost(&self, cell: GridCell, time: f64) -> f64;

    /// A lower bound on any finite value `cost` can return
    ///
    /// Used to scale the search heuristic; returning 0 is always admissible.
    fn lower_bound(&self) -> f64 {
        0.0
    }
}

impl<C: CostFunction + ?Sized> CostFunction for &C {
    fn cost(&self, cell: GridCell, time: f64) -> f64 {
        (**self).cost(cell, time)
    }

    fn lower_bound(&self) -> f64 {
        (**self).lower_bound()
    }
}

impl<C: CostFunction + ?Sized> CostFunction for Box<C> {
    fn cost(&self, cell: GridCell, time: f64) -> f64 {
        (**self).cost(cell, time)
    }

    fn lower_bound(&self) -> f64 {
        (**self).lower_bound()
    }
}

/// Search over a cost field frozen at one instant
pub trait StaticGridSearch {
    /// Find a path from `start` to `goal`, evaluating every cost at `at_time`
    fn search_static<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost: &C,
        start: GridCell,
        goal: GridCell,
        at_time: f64,
    ) -> PlanningResult<SearchOutcome>;
}

/// Search over (cell, arrival time) at constant ground speed
pub trait TimedGridSearch {
    /// Find a path from `start` (entered at `start_time`) to `goal`
    fn search_timed<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost: &C,
        start: GridCell,
        goal: GridCell,
        start_time: f64,
        ground_speed: f64,
    ) -> PlanningResult<SearchOutcome>;
}
