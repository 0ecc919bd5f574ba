//! A* search over grid cells, optionally in time
//!
//! Both entry points share one core. The static search evaluates the
//! cost field at a single fixed time. The timed search advances the clock
//! along every move by `step_length * square_size / ground_speed` and
//! charges the cost of the destination cell at the arrival time, so a
//! hazard moving into or out of a cell is seen exactly when the agent
//! would get there.
//!
//! The search minimises (cost, travelled distance) lexicographically.
//! Ties left after that are broken by insertion order, and neighbours are
//! always generated in the fixed compass order E, N, W, S, NE, NW, SW, SE,
//! so identical inputs give identical paths.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, warn};
use ordered_float::OrderedFloat;

use crate::common::{
    CostFunction, GridCell, PlanningError, PlanningResult, Point2D, StaticGridSearch,
    TimedGridSearch,
};
use crate::path_planning::grid_path::{GridPath, PathStep, SearchOutcome, SearchStats};
use crate::utils::GridMap;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Grid adjacency used for expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// E, N, W, S
    Four,
    /// Four plus the diagonals, which cost √2 times the cell weight
    Eight,
}

impl Connectivity {
    /// dx, dy, step length in cells
    fn motion_model(&self) -> &'static [(i32, i32, f64)] {
        const MOTIONS: [(i32, i32, f64); 8] = [
            (1, 0, 1.0),
            (0, 1, 1.0),
            (-1, 0, 1.0),
            (0, -1, 1.0),
            (1, 1, SQRT_2),
            (-1, 1, SQRT_2),
            (-1, -1, SQRT_2),
            (1, -1, SQRT_2),
        ];
        match self {
            Connectivity::Four => &MOTIONS[..4],
            Connectivity::Eight => &MOTIONS[..],
        }
    }

    /// Exact move distance between cells on an obstacle-free grid
    fn free_distance(&self, a: &GridCell, b: &GridCell) -> f64 {
        match self {
            Connectivity::Four => a.manhattan(b) as f64,
            Connectivity::Eight => {
                let dx = (a.x - b.x).abs();
                let dy = (a.y - b.y).abs();
                let diag = dx.min(dy) as f64;
                let straight = (dx - dy).abs() as f64;
                diag * SQRT_2 + straight
            }
        }
    }
}

/// Configuration for the A* search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub connectivity: Connectivity,
    /// Heuristic weight (1.0 = optimal, >1.0 = faster but suboptimal)
    pub heuristic_weight: f64,
    /// How many distinct arrival-time buckets a cell may be expanded in
    /// during a timed search. 1 never revisits a cell.
    pub max_visits_per_cell: usize,
    /// Turn penalty per unit of heading change: 1 for a 45 degree turn on
    /// the 8-connected grid, up to 3 for 135 degrees. 0 disables it.
    pub direction_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            heuristic_weight: 1.0,
            max_visits_per_cell: 1,
            direction_weight: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    cell: GridCell,
    time: f64,
    cost: f64,
    distance: f64,
    parent_index: Option<usize>,
}

/// Node with priority for the open set (min-heap)
#[derive(Debug, PartialEq, Eq)]
struct PriorityNode {
    priority: (OrderedFloat<f64>, OrderedFloat<f64>),
    seq: usize,
    index: usize,
}

impl Ord for PriorityNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PriorityNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How the clock moves along an edge and how (cell, time) states collapse
/// into closed-set keys
#[derive(Debug, Clone, Copy)]
enum Clock {
    Frozen,
    Advancing {
        start_time: f64,
        // seconds to cross one cell side
        cell_time: f64,
    },
}

impl Clock {
    fn arrival(&self, time: f64, step: f64) -> f64 {
        match *self {
            Clock::Frozen => time,
            Clock::Advancing { cell_time, .. } => time + step * cell_time,
        }
    }

    fn key(&self, cell: GridCell, time: f64) -> (GridCell, i64) {
        match *self {
            Clock::Frozen => (cell, 0),
            Clock::Advancing { start_time, cell_time } => {
                (cell, ((time - start_time) / cell_time).floor() as i64)
            }
        }
    }
}

/// A* planner over a [`GridMap`] and any [`CostFunction`]
///
/// The planner holds only configuration; every search builds its own open
/// and closed sets, so one planner can serve concurrent searches over
/// shared, read-only grids and cost fields.
#[derive(Debug, Clone, Default)]
pub struct AStarSearch {
    config: SearchConfig,
}

impl AStarSearch {
    pub fn new(config: SearchConfig) -> Self {
        AStarSearch { config }
    }

    pub fn with_connectivity(connectivity: Connectivity) -> Self {
        Self::new(SearchConfig {
            connectivity,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Static search between two points, evaluating costs at `at_time`
    pub fn plan_static<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost: &C,
        start: Point2D,
        goal: Point2D,
        at_time: f64,
    ) -> PlanningResult<SearchOutcome> {
        let (start_cell, goal_cell) = Self::locate(grid, start, goal)?;
        self.search_static(grid, cost, start_cell, goal_cell, at_time)
    }

    /// Timed search between two points at constant ground speed
    pub fn plan_timed<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost: &C,
        start: Point2D,
        goal: Point2D,
        start_time: f64,
        ground_speed: f64,
    ) -> PlanningResult<SearchOutcome> {
        let (start_cell, goal_cell) = Self::locate(grid, start, goal)?;
        self.search_timed(grid, cost, start_cell, goal_cell, start_time, ground_speed)
    }

    fn locate(grid: &GridMap, start: Point2D, goal: Point2D) -> PlanningResult<(GridCell, GridCell)> {
        let start_cell = grid
            .cell_of(&start)
            .ok_or(PlanningError::OutOfBounds { what: "start", point: start })?;
        let goal_cell = grid
            .cell_of(&goal)
            .ok_or(PlanningError::OutOfBounds { what: "goal", point: goal })?;
        Ok((start_cell, goal_cell))
    }

    fn check_cells(grid: &GridMap, start: GridCell, goal: GridCell) -> PlanningResult<()> {
        for (what, cell) in [("start", start), ("goal", goal)] {
            if !grid.is_inside(cell) {
                return Err(PlanningError::OutOfBounds {
                    what,
                    point: grid.position_of(cell),
                });
            }
        }
        Ok(())
    }

    fn check_config(&self) -> PlanningResult<()> {
        let weight = self.config.heuristic_weight;
        if !(weight >= 0.0) || !weight.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "heuristic weight must be finite and non-negative, got {}",
                weight
            )));
        }
        let turn = self.config.direction_weight;
        if !(turn >= 0.0) || !turn.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "direction weight must be finite and non-negative, got {}",
                turn
            )));
        }
        if self.config.max_visits_per_cell == 0 {
            return Err(PlanningError::InvalidConfiguration(
                "max_visits_per_cell must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn calc_heuristic(&self, cost_scale: f64, cell: &GridCell, goal: &GridCell) -> (f64, f64) {
        let h_cost = cost_scale * cell.euclidean(goal);
        let h_dist = self.config.connectivity.free_distance(cell, goal);
        (h_cost, h_dist)
    }

    fn priority(cost: f64, distance: f64, h: (f64, f64)) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        (OrderedFloat(cost + h.0), OrderedFloat(distance + h.1))
    }

    fn run<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost_fn: &C,
        start: GridCell,
        goal: GridCell,
        start_time: f64,
        clock: Clock,
    ) -> SearchOutcome {
        let mut stats = SearchStats::default();

        let start_cost = cost_fn.cost(start, start_time);
        if !start_cost.is_finite() {
            warn!("start cell ({}, {}) is impassable at t={}", start.x, start.y, start_time);
            return SearchOutcome::NoPath(stats);
        }

        let lower_bound = cost_fn.lower_bound();
        let cost_scale = if lower_bound.is_finite() && lower_bound > 0.0 {
            self.config.heuristic_weight * lower_bound
        } else {
            0.0
        };
        let motion = self.config.connectivity.motion_model();
        let max_visits = self.config.max_visits_per_cell;
        let direction_weight = self.config.direction_weight;

        let mut open_set = BinaryHeap::new();
        let mut closed_set: HashSet<(GridCell, i64)> = HashSet::new();
        let mut visits: HashMap<GridCell, usize> = HashMap::new();
        let mut best: HashMap<(GridCell, i64), (OrderedFloat<f64>, OrderedFloat<f64>)> = HashMap::new();
        let mut node_storage: Vec<Node> = Vec::new();
        let mut seq = 0usize;

        node_storage.push(Node {
            cell: start,
            time: start_time,
            cost: 0.0,
            distance: 0.0,
            parent_index: None,
        });
        best.insert(clock.key(start, start_time), (OrderedFloat(0.0), OrderedFloat(0.0)));
        open_set.push(PriorityNode {
            priority: Self::priority(0.0, 0.0, self.calc_heuristic(cost_scale, &start, &goal)),
            seq,
            index: 0,
        });
        stats.generated += 1;

        while let Some(current) = open_set.pop() {
            let node = node_storage[current.index].clone();
            let key = clock.key(node.cell, node.time);
            if closed_set.contains(&key) {
                continue;
            }
            let count = visits.entry(node.cell).or_insert(0);
            if *count >= max_visits {
                continue;
            }
            *count += 1;
            closed_set.insert(key);
            stats.expanded += 1;
            stats.searched_weights.entry(node.cell).or_insert(node.cost);

            if node.cell == goal {
                let steps = Self::build_path(current.index, &node_storage);
                return SearchOutcome::Found(GridPath::new(steps, node.cost, stats));
            }

            // move that led into this node; the start has none
            let heading = node.parent_index.map(|p| {
                let prev = node_storage[p].cell;
                (node.cell.x - prev.x, node.cell.y - prev.y)
            });

            for &(dx, dy, step) in motion {
                let next = node.cell.offset(dx, dy);
                if !grid.is_inside(next) {
                    continue;
                }
                if visits.get(&next).copied().unwrap_or(0) >= max_visits {
                    continue;
                }
                let time = clock.arrival(node.time, step);
                let next_key = clock.key(next, time);
                if closed_set.contains(&next_key) {
                    continue;
                }
                let cell_cost = cost_fn.cost(next, time);
                // impassable edges are never enqueued
                if !cell_cost.is_finite() {
                    continue;
                }
                let turn_cost = match heading {
                    Some((hx, hy)) => ((dx - hx).abs() + (dy - hy).abs()) as f64 * direction_weight,
                    None => 0.0,
                };
                let new_cost = node.cost + cell_cost.max(0.0) * step + turn_cost;
                let new_distance = node.distance + step;
                let score = (OrderedFloat(new_cost), OrderedFloat(new_distance));
                match best.entry(next_key) {
                    Entry::Occupied(mut e) => {
                        if score >= *e.get() {
                            continue;
                        }
                        e.insert(score);
                    }
                    Entry::Vacant(e) => {
                        e.insert(score);
                    }
                }

                node_storage.push(Node {
                    cell: next,
                    time,
                    cost: new_cost,
                    distance: new_distance,
                    parent_index: Some(current.index),
                });
                seq += 1;
                open_set.push(PriorityNode {
                    priority: Self::priority(
                        new_cost,
                        new_distance,
                        self.calc_heuristic(cost_scale, &next, &goal),
                    ),
                    seq,
                    index: node_storage.len() - 1,
                });
                stats.generated += 1;
            }
        }

        SearchOutcome::NoPath(stats)
    }

    fn build_path(goal_index: usize, node_storage: &[Node]) -> Vec<PathStep> {
        let mut steps = Vec::new();
        let mut current_index = Some(goal_index);

        while let Some(index) = current_index {
            let node = &node_storage[index];
            steps.push(PathStep {
                cell: node.cell,
                time: node.time,
            });
            current_index = node.parent_index;
        }

        steps.reverse();
        steps
    }

    fn log_outcome(kind: &str, outcome: &SearchOutcome) {
        match outcome {
            SearchOutcome::Found(path) => debug!(
                "{} search: goal reached with {} cells at cost {} after {} expansions",
                kind,
                path.len(),
                path.cost(),
                path.stats().expanded
            ),
            SearchOutcome::NoPath(stats) => debug!(
                "{} search: open set empty after {} expansions, no path",
                kind, stats.expanded
            ),
        }
    }
}

impl StaticGridSearch for AStarSearch {
    fn search_static<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost: &C,
        start: GridCell,
        goal: GridCell,
        at_time: f64,
    ) -> PlanningResult<SearchOutcome> {
        self.check_config()?;
        Self::check_cells(grid, start, goal)?;
        debug!(
            "static search from ({}, {}) to ({}, {})",
            start.x, start.y, goal.x, goal.y
        );
        let outcome = self.run(grid, cost, start, goal, at_time, Clock::Frozen);
        Self::log_outcome("static", &outcome);
        Ok(outcome)
    }
}

impl TimedGridSearch for AStarSearch {
    fn search_timed<C: CostFunction>(
        &self,
        grid: &GridMap,
        cost: &C,
        start: GridCell,
        goal: GridCell,
        start_time: f64,
        ground_speed: f64,
    ) -> PlanningResult<SearchOutcome> {
        self.check_config()?;
        if !(ground_speed > 0.0) || !ground_speed.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "ground speed must be positive and finite, got {}",
                ground_speed
            )));
        }
        if !start_time.is_finite() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "start time must be finite, got {}",
                start_time
            )));
        }
        Self::check_cells(grid, start, goal)?;
        debug!(
            "timed search from ({}, {}) to ({}, {}) at t={} gs={}",
            start.x, start.y, goal.x, goal.y, start_time, ground_speed
        );
        let clock = Clock::Advancing {
            start_time,
            cell_time: grid.square_size() / ground_speed,
        };
        let outcome = self.run(grid, cost, start, goal, start_time, clock);
        Self::log_outcome("timed", &outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BoundingRect;
    use crate::hazard::{HazardSet, MovingPolygon};
    use crate::path_planning::cost_model::timed_cost;
    use crate::utils::WeightMap;
    use nalgebra::Vector2;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// n x n cells of size 1 starting at the origin
    fn square_grid(n: i32) -> GridMap {
        let extent = (n - 1) as f64;
        GridMap::new(BoundingRect::new(0.0, 0.0, extent, extent), 0, 1.0).unwrap()
    }

    fn cell_polygon(grid: &GridMap, cell: GridCell) -> Vec<Point2D> {
        let c = grid.corner_of(cell);
        let s = grid.square_size();
        vec![
            Point2D::new(c.x, c.y),
            Point2D::new(c.x + s, c.y),
            Point2D::new(c.x + s, c.y + s),
            Point2D::new(c.x, c.y + s),
        ]
    }

    fn found(outcome: SearchOutcome) -> GridPath {
        match outcome {
            SearchOutcome::Found(path) => path,
            SearchOutcome::NoPath(stats) => panic!("expected a path, search expanded {}", stats.expanded),
        }
    }

    #[test]
    fn test_zero_weight_diagonal() {
        let grid = square_grid(5);
        assert_eq!(grid.size(), (5, 5));
        let weights = WeightMap::uniform(&grid, 0.0).unwrap();
        let planner = AStarSearch::default();

        let path = found(
            planner
                .search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(4, 4), 0.0)
                .unwrap(),
        );
        assert_eq!(path.move_count(), 4);
        assert_eq!(path.cost(), 0.0);
        let expected: Vec<GridCell> = (0..5).map(|i| GridCell::new(i, i)).collect();
        assert_eq!(path.cells(), expected);
    }

    #[test]
    fn test_four_connected_detour_around_hazard() {
        let grid = square_grid(5);
        let weights = WeightMap::uniform(&grid, 0.0).unwrap();
        let hazards = HazardSet::with_avoidance(vec![
            MovingPolygon::fixed(cell_polygon(&grid, GridCell::new(2, 2))).unwrap(),
        ]);
        let cost = timed_cost(&grid, &weights, &hazards, None);
        let planner = AStarSearch::with_connectivity(Connectivity::Four);

        let path = found(
            planner
                .search_timed(&grid, &cost, GridCell::new(0, 0), GridCell::new(4, 4), 0.0, 1.0)
                .unwrap(),
        );
        assert_eq!(path.move_count(), 8);
        assert!(!path.cells().contains(&GridCell::new(2, 2)));
        for w in path.cells().windows(2) {
            assert_eq!(w[0].manhattan(&w[1]), 1);
        }
    }

    #[test]
    fn test_wall_reports_no_path() {
        let grid = square_grid(6);
        let mut weights = WeightMap::uniform(&grid, 1.0).unwrap();
        for y in 0..6 {
            weights.clear_weight(GridCell::new(3, y));
        }
        let planner = AStarSearch::default();

        let outcome = planner
            .search_static(&grid, &weights, GridCell::new(0, 2), GridCell::new(5, 2), 0.0)
            .unwrap();
        assert!(matches!(outcome, SearchOutcome::NoPath(_)));
        assert!(outcome.stats().expanded > 0);

        let timed = planner
            .search_timed(&grid, &weights, GridCell::new(0, 2), GridCell::new(5, 2), 0.0, 2.0)
            .unwrap();
        assert!(!timed.is_found());
    }

    #[test]
    fn test_start_equals_goal_is_a_path() {
        let grid = square_grid(3);
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        let path = found(
            AStarSearch::default()
                .search_static(&grid, &weights, GridCell::new(1, 1), GridCell::new(1, 1), 0.0)
                .unwrap(),
        );
        assert_eq!(path.cells(), vec![GridCell::new(1, 1)]);
        assert_eq!(path.cost(), 0.0);
    }

    #[test]
    fn test_impassable_start_is_no_path() {
        let grid = square_grid(3);
        let mut weights = WeightMap::uniform(&grid, 1.0).unwrap();
        weights.clear_weight(GridCell::new(0, 0));
        let outcome = AStarSearch::default()
            .search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(2, 2), 0.0)
            .unwrap();
        assert!(!outcome.is_found());
    }

    #[test]
    fn test_configuration_errors() {
        let grid = square_grid(3);
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        let planner = AStarSearch::default();
        assert!(matches!(
            planner.search_timed(&grid, &weights, GridCell::new(0, 0), GridCell::new(2, 2), 0.0, 0.0),
            Err(PlanningError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            planner.search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(7, 2), 0.0),
            Err(PlanningError::OutOfBounds { what: "goal", .. })
        ));
        assert!(matches!(
            planner.plan_static(&grid, &weights, Point2D::new(-5.0, 0.0), Point2D::new(1.0, 1.0), 0.0),
            Err(PlanningError::OutOfBounds { what: "start", .. })
        ));
        let bad = AStarSearch::new(SearchConfig {
            max_visits_per_cell: 0,
            ..Default::default()
        });
        assert!(bad
            .search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(2, 2), 0.0)
            .is_err());
        let negative_turn = AStarSearch::new(SearchConfig {
            direction_weight: -1.0,
            ..Default::default()
        });
        assert!(matches!(
            negative_turn.search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(2, 2), 0.0),
            Err(PlanningError::InvalidConfiguration(_))
        ));
    }

    fn turn_count(cells: &[GridCell]) -> usize {
        cells
            .windows(3)
            .filter(|w| (w[1].x - w[0].x, w[1].y - w[0].y) != (w[2].x - w[1].x, w[2].y - w[1].y))
            .count()
    }

    #[test]
    fn test_direction_weight_straightens_equal_cost_paths() {
        // two rows: every 4-connected route to the goal takes four E moves and one N
        let grid = GridMap::new(BoundingRect::new(0.0, 0.0, 4.0, 1.0), 0, 1.0).unwrap();
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        let start = GridCell::new(0, 0);
        let goal = GridCell::new(4, 1);

        let plain = found(
            AStarSearch::with_connectivity(Connectivity::Four)
                .search_static(&grid, &weights, start, goal, 0.0)
                .unwrap(),
        );
        assert_eq!(plain.move_count(), 5);
        assert!((plain.cost() - 5.0).abs() < 1e-12);

        let smooth = AStarSearch::new(SearchConfig {
            connectivity: Connectivity::Four,
            direction_weight: 0.25,
            ..Default::default()
        });
        let path = found(smooth.search_static(&grid, &weights, start, goal, 0.0).unwrap());
        assert_eq!(path.move_count(), 5);
        // one 90 degree turn costs 2 units of heading change
        assert_eq!(turn_count(&path.cells()), 1);
        assert!((path.cost() - 5.5).abs() < 1e-12);

        let timed = found(smooth.search_timed(&grid, &weights, start, goal, 0.0, 1.0).unwrap());
        assert_eq!(turn_count(&timed.cells()), 1);
    }

    #[test]
    fn test_prefers_cheap_cells() {
        let grid = square_grid(5);
        let mut weights = WeightMap::uniform(&grid, 10.0).unwrap();
        // cheap corridor along the bottom and right edges
        for i in 0..5 {
            weights.set_weight(GridCell::new(i, 0), 1.0).unwrap();
            weights.set_weight(GridCell::new(4, i), 1.0).unwrap();
        }
        let path = found(
            AStarSearch::with_connectivity(Connectivity::Four)
                .search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(4, 4), 0.0)
                .unwrap(),
        );
        assert_eq!(path.cost(), 8.0);
        assert!(path.cells().iter().all(|c| c.y == 0 || c.x == 4));
    }

    #[test]
    fn test_diagonal_costs_sqrt2() {
        let grid = square_grid(3);
        let weights = WeightMap::uniform(&grid, 2.0).unwrap();
        let path = found(
            AStarSearch::default()
                .search_static(&grid, &weights, GridCell::new(0, 0), GridCell::new(2, 2), 0.0)
                .unwrap(),
        );
        assert!((path.cost() - 4.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_timed_arrival_times() {
        let grid = GridMap::new(BoundingRect::new(0.0, 0.0, 20.0, 20.0), 0, 5.0).unwrap();
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        let path = found(
            AStarSearch::default()
                .search_timed(&grid, &weights, GridCell::new(0, 0), GridCell::new(3, 1), 100.0, 2.5)
                .unwrap(),
        );
        let steps = path.steps();
        assert!((steps[0].time - 100.0).abs() < 1e-12);
        let positions = path.positions(&grid);
        let mut dist = 0.0;
        for i in 1..steps.len() {
            dist += positions[i - 1].distance(&positions[i]);
            assert!(steps[i].time >= steps[i - 1].time);
            assert!((steps[i].time - (100.0 + dist / 2.5)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_waits_out_moving_storm_by_timing() {
        // A storm sweeps north through column 3 of a 7x7 grid. With
        // arrival-time costs the agent crosses behind it; evaluated at the
        // departure time the column would look blocked.
        let grid = square_grid(7);
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        let wall: Vec<Point2D> = vec![
            Point2D::new(3.0, -7.0),
            Point2D::new(4.0, -7.0),
            Point2D::new(4.0, 7.0),
            Point2D::new(3.0, 7.0),
        ];
        let storm = MovingPolygon::translating(wall, Vector2::new(0.0, 10.0), 0.0, 100.0).unwrap();
        let hazards = HazardSet::with_avoidance(vec![storm]);
        let cost = timed_cost(&grid, &weights, &hazards, None);
        let planner = AStarSearch::default();

        let frozen = planner
            .search_static(&grid, &cost, GridCell::new(0, 3), GridCell::new(6, 3), 0.0)
            .unwrap();
        assert!(!frozen.is_found());

        let path = found(
            planner
                .search_timed(&grid, &cost, GridCell::new(0, 3), GridCell::new(6, 3), 0.0, 1.0)
                .unwrap(),
        );
        for step in path.steps() {
            let center = grid.position_of(step.cell);
            assert!(!hazards.is_blocked(&center, step.time));
        }
    }

    #[test]
    fn test_containment_keeps_path_inside() {
        let grid = square_grid(7);
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        // L-shaped corridor: bottom row then right column
        let corridor = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(7.0, 0.0),
            Point2D::new(7.0, 7.0),
            Point2D::new(6.0, 7.0),
            Point2D::new(6.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        let mut hazards = HazardSet::default();
        hazards.add_containment(MovingPolygon::fixed(corridor).unwrap());
        let cost = timed_cost(&grid, &weights, &hazards, None);

        let path = found(
            AStarSearch::default()
                .search_timed(&grid, &cost, GridCell::new(0, 0), GridCell::new(6, 6), 0.0, 1.0)
                .unwrap(),
        );
        for step in path.steps() {
            assert!(hazards.is_contained(&grid.position_of(step.cell), step.time));
        }
        // along the bottom, one diagonal into the column, then north
        assert_eq!(path.move_count(), 11);
    }

    #[test]
    fn test_lookahead_cutoff_frees_far_future() {
        let grid = square_grid(6);
        let mut weights = WeightMap::uniform(&grid, 1.0).unwrap();
        for y in 0..6 {
            weights.clear_weight(GridCell::new(4, y));
        }
        let hazards = HazardSet::default();
        let planner = AStarSearch::default();

        let blocked = timed_cost(&grid, &weights, &hazards, None);
        assert!(!planner
            .search_timed(&grid, &blocked, GridCell::new(0, 0), GridCell::new(5, 0), 0.0, 1.0)
            .unwrap()
            .is_found());

        // past t=2 every cell is free, including the wall; only the first
        // move (arriving at t=1) is charged once the second move is a
        // diagonal arriving after the cutoff
        let horizon = timed_cost(&grid, &weights, &hazards, Some(2.0));
        let path = found(
            planner
                .search_timed(&grid, &horizon, GridCell::new(0, 0), GridCell::new(5, 0), 0.0, 1.0)
                .unwrap(),
        );
        assert_eq!(path.cost(), 1.0);
        assert_eq!(path.cells().last(), Some(&GridCell::new(5, 0)));
    }

    #[test]
    fn test_deterministic_results() {
        let grid = square_grid(12);
        let mut rng = StdRng::seed_from_u64(7);
        let mut weights = WeightMap::new(&grid);
        for cell in grid.cells() {
            weights.set_weight(cell, rng.gen_range(0.0..3.0)).unwrap();
        }
        let planner = AStarSearch::default();
        let a = planner
            .search_timed(&grid, &weights, GridCell::new(0, 0), GridCell::new(11, 9), 0.0, 1.0)
            .unwrap();
        let b = planner
            .search_timed(&grid, &weights, GridCell::new(0, 0), GridCell::new(11, 9), 0.0, 1.0)
            .unwrap();
        assert_eq!(a.path().map(|p| p.cells()), b.path().map(|p| p.cells()));
    }

    #[test]
    fn test_random_storms_never_entered() {
        let grid = square_grid(15);
        let weights = WeightMap::uniform(&grid, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let storms = (0..3)
                .map(|_| {
                    let x = rng.gen_range(3.0..11.0);
                    let y = rng.gen_range(0.0..14.0);
                    let size = rng.gen_range(1.0..3.0);
                    let v = Vector2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
                    let pts = vec![
                        Point2D::new(x, y),
                        Point2D::new(x + size, y),
                        Point2D::new(x + size, y + size),
                        Point2D::new(x, y + size),
                    ];
                    MovingPolygon::translating(pts, v, 0.0, 60.0).unwrap()
                })
                .collect();
            let hazards = HazardSet::with_avoidance(storms);
            let cost = timed_cost(&grid, &weights, &hazards, None);
            let outcome = AStarSearch::default()
                .search_timed(&grid, &cost, GridCell::new(0, 7), GridCell::new(14, 7), 0.0, 1.0)
                .unwrap();
            if let SearchOutcome::Found(path) = outcome {
                for step in path.steps() {
                    assert!(!hazards.is_blocked(&grid.position_of(step.cell), step.time));
                }
            }
        }
    }

    #[test]
    fn test_revisits_allow_waiting_in_time() {
        // Column 2 is a wall except for a gate at (2, 2). A storm strip
        // drifting south covers the gate until t = 6.2, so the only way
        // through is to loiter on the west side first.
        let grid = square_grid(5);
        let mut weights = WeightMap::uniform(&grid, 1.0).unwrap();
        for y in (0..5).filter(|&y| y != 2) {
            weights.clear_weight(GridCell::new(2, y));
        }
        let strip = vec![
            Point2D::new(2.0, 2.0),
            Point2D::new(3.0, 2.0),
            Point2D::new(3.0, 8.7),
            Point2D::new(2.0, 8.7),
        ];
        let storm = MovingPolygon::translating(strip, Vector2::new(0.0, -1.0), 0.0, 100.0).unwrap();
        let hazards = HazardSet::with_avoidance(vec![storm]);
        let cost = timed_cost(&grid, &weights, &hazards, None);
        let gate = GridCell::new(2, 2);
        assert!(cost.cost(gate, 6.1).is_infinite());
        assert_eq!(cost.cost(gate, 6.3), 1.0);

        let strict = AStarSearch::default()
            .search_timed(&grid, &cost, GridCell::new(0, 2), GridCell::new(4, 2), 0.0, 1.0)
            .unwrap();
        if let SearchOutcome::Found(path) = &strict {
            for step in path.steps() {
                assert!(!hazards.is_blocked(&grid.position_of(step.cell), step.time));
            }
        }

        let patient = AStarSearch::new(SearchConfig {
            max_visits_per_cell: 16,
            ..Default::default()
        });
        let path = found(
            patient
                .search_timed(&grid, &cost, GridCell::new(0, 2), GridCell::new(4, 2), 0.0, 1.0)
                .unwrap(),
        );
        let gate_step = path.steps().iter().find(|s| s.cell == gate).unwrap();
        assert!(gate_step.time > 6.2);
        for step in path.steps() {
            assert!(!hazards.is_blocked(&grid.position_of(step.cell), step.time));
        }
    }

    proptest! {
        #[test]
        fn prop_uniform_grid_is_chebyshev_optimal(
            sx in 0i32..10, sy in 0i32..10, gx in 0i32..10, gy in 0i32..10,
        ) {
            let grid = square_grid(10);
            let weights = WeightMap::uniform(&grid, 1.0).unwrap();
            let start = GridCell::new(sx, sy);
            let goal = GridCell::new(gx, gy);

            let eight = AStarSearch::default()
                .search_static(&grid, &weights, start, goal, 0.0)
                .unwrap();
            let path = eight.path().unwrap();
            prop_assert_eq!(path.move_count() as i32, start.chebyshev(&goal));

            let four = AStarSearch::with_connectivity(Connectivity::Four)
                .search_static(&grid, &weights, start, goal, 0.0)
                .unwrap();
            let path = four.path().unwrap();
            prop_assert_eq!(path.move_count() as i32, start.manhattan(&goal));
            prop_assert!((path.cost() - start.manhattan(&goal) as f64).abs() < 1e-9);
        }

        #[test]
        fn prop_arrival_time_is_distance_over_speed(
            gx in 0i32..8, gy in 0i32..8, speed in 0.5..50.0f64, t0 in -100.0..100.0f64,
        ) {
            let grid = GridMap::new(BoundingRect::new(0.0, 0.0, 14.0, 14.0), 0, 2.0).unwrap();
            let weights = WeightMap::uniform(&grid, 1.0).unwrap();
            let outcome = AStarSearch::default()
                .search_timed(&grid, &weights, GridCell::new(0, 0), GridCell::new(gx, gy), t0, speed)
                .unwrap();
            let path = outcome.path().unwrap();
            let positions = path.positions(&grid);
            let steps = path.steps();
            let mut dist = 0.0;
            for i in 1..steps.len() {
                dist += positions[i - 1].distance(&positions[i]);
                prop_assert!(steps[i].time >= steps[i - 1].time);
                prop_assert!((steps[i].time - (t0 + dist / speed)).abs() < 1e-6);
            }
        }
    }
}
