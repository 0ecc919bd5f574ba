//! Search results and grid-path post-processing
//!
//! Besides the result types this module converts between grid paths and
//! spatial trajectories: rasterising a timed trajectory onto the grid,
//! thinning straight runs, and turning a grid path back into timed
//! waypoints.

use std::collections::HashMap;

use std::f64::consts::{FRAC_PI_4, TAU};

use crate::common::{GridCell, Point2D, TimedPoint};
use crate::utils::{closest_point_on_segment, GridMap};

/// One cell of a found path with the time the agent arrives there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub cell: GridCell,
    pub time: f64,
}

/// Counters and per-cell costs gathered during one search
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Nodes popped and expanded
    pub expanded: usize,
    /// Nodes pushed onto the open set
    pub generated: usize,
    /// Accumulated cost at which each cell was first finalised
    pub searched_weights: HashMap<GridCell, f64>,
}

impl SearchStats {
    pub fn min_searched_weight(&self) -> Option<f64> {
        self.searched_weights.values().copied().reduce(f64::min)
    }

    pub fn max_searched_weight(&self) -> Option<f64> {
        self.searched_weights.values().copied().reduce(f64::max)
    }
}

/// A complete path from the start cell to the goal cell
#[derive(Debug, Clone)]
pub struct GridPath {
    steps: Vec<PathStep>,
    cost: f64,
    stats: SearchStats,
}

impl GridPath {
    pub(crate) fn new(steps: Vec<PathStep>, cost: f64, stats: SearchStats) -> Self {
        Self { steps, cost, stats }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn cells(&self) -> Vec<GridCell> {
        self.steps.iter().map(|s| s.cell).collect()
    }

    pub fn arrival_times(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.time).collect()
    }

    /// Number of cells, including start and goal
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: a found path holds at least the start cell
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of moves between cells
    pub fn move_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Accumulated traversal cost, excluding the start cell
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Cell centres in the working frame
    pub fn positions(&self, grid: &GridMap) -> Vec<Point2D> {
        self.steps.iter().map(|s| grid.position_of(s.cell)).collect()
    }
}

/// Result of a search that ran to completion
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(GridPath),
    /// The open set emptied before the goal was reached
    NoPath(SearchStats),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&GridPath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NoPath(_) => None,
        }
    }

    pub fn into_path(self) -> Option<GridPath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NoPath(_) => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Found(path) => path.stats(),
            SearchOutcome::NoPath(stats) => stats,
        }
    }
}

fn direction(from: &GridCell, to: &GridCell) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

/// Drop the interior cells of straight runs, keeping both ends of the path
pub fn thin(cells: &[GridCell]) -> Vec<GridCell> {
    if cells.len() <= 2 {
        return cells.to_vec();
    }
    let mut thinned = vec![cells[0]];
    for w in cells.windows(3) {
        if direction(&w[0], &w[1]) != direction(&w[1], &w[2]) {
            thinned.push(w[1]);
        }
    }
    thinned.push(cells[cells.len() - 1]);
    thinned
}

/// Position on a piecewise-linear timed trajectory, clamped to its ends
pub fn trajectory_position(trajectory: &[TimedPoint], time: f64) -> Option<Point2D> {
    let first = trajectory.first()?;
    if time <= first.time {
        return Some(first.position);
    }
    for w in trajectory.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        if time <= b.time {
            let span = b.time - a.time;
            if span <= 0.0 {
                return Some(b.position);
            }
            return Some(a.position.interpolate(&b.position, (time - a.time) / span));
        }
    }
    trajectory.last().map(|p| p.position)
}

/// Cells visited by a timed trajectory, in order and without repeats
///
/// The trajectory is sampled `2 * (width + height)` times between its
/// first and last time; samples off the grid are skipped.
pub fn rasterize(grid: &GridMap, trajectory: &[TimedPoint]) -> Vec<GridCell> {
    let mut cells: Vec<GridCell> = Vec::new();
    let (first, last) = match (trajectory.first(), trajectory.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return cells,
    };
    let samples = (2 * (grid.x_width() + grid.y_width())).max(1) as usize;
    let dt = (last.time - first.time) / samples as f64;
    for i in 0..=samples {
        let t = first.time + dt * i as f64;
        let cell = trajectory_position(trajectory, t).and_then(|p| grid.cell_of(&p));
        if let Some(cell) = cell {
            if cells.last() != Some(&cell) {
                cells.push(cell);
            }
        }
    }
    cells
}

fn heading(from: &Point2D, to: &Point2D) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Absolute angle between two headings, in `[0, pi]`
fn turn_delta(a: f64, b: f64) -> f64 {
    let d = (b - a).rem_euclid(TAU);
    d.min(TAU - d)
}

/// Point of a timed polyline closest to `p`, with its interpolated time
fn closest_timed_point(polyline: &[TimedPoint], p: &Point2D) -> Option<TimedPoint> {
    polyline
        .windows(2)
        .map(|w| {
            let (a, b) = (&w[0], &w[1]);
            let q = closest_point_on_segment(&a.position, &b.position, p);
            let len = a.position.distance(&b.position);
            let frac = if len > 0.0 { a.position.distance(&q) / len } else { 0.0 };
            TimedPoint::new(q, a.time + frac * (b.time - a.time))
        })
        .min_by(|x, y| x.position.distance(p).total_cmp(&y.position.distance(p)))
}

/// Timed waypoints flying a grid path at constant ground speed
///
/// The result starts at `start`, passes through the centres of the
/// thinned interior cells and ends at `goal`. When the leg into `goal`
/// would turn more than 45 degrees off the previous leg, the last interior
/// waypoint is replaced by the point of the route closest to the centre
/// of the cell two before the end (or dropped, if that point is within
/// one cell of the waypoint before it).
pub fn to_waypoints(
    grid: &GridMap,
    cells: &[GridCell],
    start: TimedPoint,
    goal: Point2D,
    ground_speed: f64,
) -> Vec<TimedPoint> {
    let mut waypoints = vec![start];
    let thinned = thin(cells);
    let interior = if thinned.len() > 2 { &thinned[1..thinned.len() - 1] } else { &[][..] };

    let mut last = start;
    for cell in interior {
        let center = grid.position_of(*cell);
        let time = last.time + last.position.distance(&center) / ground_speed;
        last = TimedPoint::new(center, time);
        waypoints.push(last);
    }

    let n = waypoints.len();
    if n >= 2 && cells.len() > 3 {
        let prev = waypoints[n - 2].position;
        let final_leg = heading(&prev, &last.position);
        let to_goal = heading(&last.position, &goal);
        let moved = prev.distance(&last.position) > 0.0 && last.position.distance(&goal) > 0.0;
        if moved && turn_delta(final_leg, to_goal) > FRAC_PI_4 {
            let pivot = grid.position_of(cells[cells.len() - 3]);
            let nearest = closest_timed_point(&waypoints, &pivot);
            waypoints.pop();
            if let Some(nearest) = nearest {
                let before = waypoints[waypoints.len() - 1];
                if before.position.distance(&nearest.position) > grid.square_size() {
                    waypoints.push(nearest);
                }
            }
            last = waypoints[waypoints.len() - 1];
        }
    }

    let time = last.time + last.position.distance(&goal) / ground_speed;
    waypoints.push(TimedPoint::new(goal, time));
    waypoints
}
