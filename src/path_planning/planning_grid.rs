//! Planning grid: one routing query bundled with its grid and cost data
//!
//! A `PlanningGrid` owns the grid indexer, the static weight field, the
//! hazard set and the query (start, goal, start time, ground speed). It is
//! meant to be built once, have its weights established, and then be
//! solved with [`PlanningGrid::optimal_path`].

use log::debug;

use crate::common::{
    BoundingRect, GridCell, PlanningError, PlanningResult, Point2D, StaticGridSearch,
    TimedGridSearch, TimedPoint,
};
use crate::hazard::HazardSet;
use crate::path_planning::a_star::AStarSearch;
use crate::path_planning::cost_model::{timed_cost, TimedCost};
use crate::path_planning::grid_path::{self, GridPath, SearchOutcome};
use crate::utils::{GridConfig, GridMap, WeightMap};

/// Grid, weights and hazards for one start-to-goal routing query
#[derive(Debug, Clone)]
pub struct PlanningGrid {
    grid: GridMap,
    weights: WeightMap,
    hazards: HazardSet,
    lookahead: Option<f64>,
    start: Point2D,
    goal: Point2D,
    start_time: f64,
    ground_speed: f64,
}

impl PlanningGrid {
    /// Grid over `bounds` for a flight from `start` to `goal`
    ///
    /// Every cell starts without a weight (impassable); establish the
    /// weight field through [`weights_mut`](Self::weights_mut) before
    /// searching.
    pub fn new(
        bounds: BoundingRect,
        start: TimedPoint,
        goal: Point2D,
        ground_speed: f64,
        config: &GridConfig,
    ) -> PlanningResult<Self> {
        if !(ground_speed > 0.0) || !ground_speed.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "ground speed must be positive and finite, got {}",
                ground_speed
            )));
        }
        if !start.time.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "start time must be finite, got {}",
                start.time
            )));
        }

        let mut grid = GridMap::from_config(bounds, config)?;
        if config.snap_to_start {
            grid = grid.snapped_to(start.position)?;
        }
        if grid.cell_of(&start.position).is_none() {
            return Err(PlanningError::OutOfBounds {
                what: "start",
                point: start.position,
            });
        }
        if grid.cell_of(&goal).is_none() {
            return Err(PlanningError::OutOfBounds { what: "goal", point: goal });
        }

        let weights = WeightMap::new(&grid);
        debug!(
            "planning grid {}x{} from ({}, {}) at t={} to ({}, {}) gs={}",
            grid.x_width(),
            grid.y_width(),
            start.position.x,
            start.position.y,
            start.time,
            goal.x,
            goal.y,
            ground_speed
        );

        Ok(Self {
            grid,
            weights,
            hazards: HazardSet::default(),
            lookahead: None,
            start: start.position,
            goal,
            start_time: start.time,
            ground_speed,
        })
    }

    /// Grid around a timed trajectory: start at its first point, goal at
    /// its last, flown at the trajectory's average ground speed
    pub fn from_trajectory(trajectory: &[TimedPoint], config: &GridConfig) -> PlanningResult<Self> {
        let (first, last) = match (trajectory.first(), trajectory.last()) {
            (Some(first), Some(last)) if trajectory.len() >= 2 => (*first, *last),
            _ => {
                return Err(PlanningError::InvalidParameter(
                    "trajectory needs at least two points".to_string(),
                ))
            }
        };
        let length: f64 = trajectory
            .windows(2)
            .map(|w| w[0].position.distance(&w[1].position))
            .sum();
        let elapsed = last.time - first.time;
        if !(elapsed > 0.0) {
            return Err(PlanningError::InvalidParameter(format!(
                "trajectory must move forward in time, spans {}",
                elapsed
            )));
        }
        let bounds = BoundingRect::from_points(trajectory.iter().map(|p| &p.position));
        Self::new(bounds, first, last.position, length / elapsed, config)
    }

    pub fn with_hazards(mut self, hazards: HazardSet) -> Self {
        self.hazards = hazards;
        self
    }

    /// Treat every time after `cutoff` as free
    pub fn with_lookahead(mut self, cutoff: Option<f64>) -> PlanningResult<Self> {
        if let Some(t) = cutoff {
            if t.is_nan() {
                return Err(PlanningError::InvalidConfiguration(
                    "lookahead cutoff must not be NaN".to_string(),
                ));
            }
        }
        self.lookahead = cutoff;
        Ok(self)
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn weights(&self) -> &WeightMap {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut WeightMap {
        &mut self.weights
    }

    pub fn hazards(&self) -> &HazardSet {
        &self.hazards
    }

    pub fn lookahead(&self) -> Option<f64> {
        self.lookahead
    }

    pub fn start(&self) -> Point2D {
        self.start
    }

    pub fn goal(&self) -> Point2D {
        self.goal
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn ground_speed(&self) -> f64 {
        self.ground_speed
    }

    pub fn start_cell(&self) -> GridCell {
        // checked at construction
        self.grid.cell_of(&self.start).unwrap_or(GridCell::new(-1, -1))
    }

    pub fn goal_cell(&self) -> GridCell {
        self.grid.cell_of(&self.goal).unwrap_or(GridCell::new(-1, -1))
    }

    /// Weights, hazards and lookahead combined into one cost function
    pub fn cost_function(&self) -> TimedCost<'_> {
        timed_cost(&self.grid, &self.weights, &self.hazards, self.lookahead)
    }

    /// Timed A* search for this grid's own query
    pub fn optimal_path(&self) -> PlanningResult<SearchOutcome> {
        self.optimal_path_with(&AStarSearch::default())
    }

    pub fn optimal_path_with<S: TimedGridSearch>(&self, search: &S) -> PlanningResult<SearchOutcome> {
        search.search_timed(
            &self.grid,
            &self.cost_function(),
            self.start_cell(),
            self.goal_cell(),
            self.start_time,
            self.ground_speed,
        )
    }

    /// Search with every cost frozen at the start time
    pub fn optimal_path_static(&self) -> PlanningResult<SearchOutcome> {
        self.optimal_path_static_with(&AStarSearch::default())
    }

    pub fn optimal_path_static_with<S: StaticGridSearch>(&self, search: &S) -> PlanningResult<SearchOutcome> {
        search.search_static(
            &self.grid,
            &self.cost_function(),
            self.start_cell(),
            self.goal_cell(),
            self.start_time,
        )
    }

    /// Cells visited by `trajectory` on this grid
    pub fn grid_path(&self, trajectory: &[TimedPoint]) -> Vec<GridCell> {
        grid_path::rasterize(&self.grid, trajectory)
    }

    /// Timed waypoints from the start point to the goal point along `path`
    pub fn to_waypoints(&self, path: &GridPath) -> Vec<TimedPoint> {
        grid_path::to_waypoints(
            &self.grid,
            &path.cells(),
            TimedPoint::new(self.start, self.start_time),
            self.goal,
            self.ground_speed,
        )
    }
}
