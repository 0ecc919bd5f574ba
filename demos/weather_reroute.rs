//! Weather Reroute Example
//!
//! Routes a flight across a 100 x 60 region scattered with drifting storm
//! cells and compares the frozen-time route with the time-aware one.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use grid_reroute::common::{BoundingRect, Point2D, TimedPoint};
use grid_reroute::hazard::{HazardSet, MovingPolygon};
use grid_reroute::path_planning::{PlanningGrid, SearchOutcome};
use grid_reroute::utils::{GridConfig, Polygon};

fn storm(rng: &mut StdRng, jitter: &Normal<f64>) -> Option<MovingPolygon> {
    let cx = rng.gen_range(20.0..80.0);
    let cy = rng.gen_range(0.0..60.0);
    let radius = rng.gen_range(4.0..9.0);
    let points: Vec<Point2D> = (0..8)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::PI / 4.0;
            let r = radius + jitter.sample(rng);
            Point2D::new(cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect();
    let velocity = Vector2::new(rng.gen_range(-0.3..0.3), rng.gen_range(-0.6..0.6));
    MovingPolygon::translating(points, velocity, 0.0, 200.0).ok()
}

fn report(label: &str, grid: &PlanningGrid, outcome: &SearchOutcome) {
    match outcome.path() {
        Some(path) => {
            let waypoints = grid.to_waypoints(path);
            println!(
                "{}: {} cells, cost {:.2}, {} waypoints, arrival t={:.1} ({} expanded)",
                label,
                path.len(),
                path.cost(),
                waypoints.len(),
                waypoints.last().map(|w| w.time).unwrap_or(f64::NAN),
                path.stats().expanded
            );
            for wp in &waypoints {
                println!("  ({:6.2}, {:6.2}) t={:6.1}", wp.position.x, wp.position.y, wp.time);
            }
        }
        None => println!("{}: no route ({} expanded)", label, outcome.stats().expanded),
    }
}

fn main() {
    println!("Weather reroute start!!");

    let mut rng = StdRng::seed_from_u64(7);
    let jitter = Normal::new(0.0, 0.8).expect("valid normal distribution");

    let config = GridConfig {
        square_size: 2.0,
        buffer: 2,
        snap_to_start: true,
    };
    let mut grid = match PlanningGrid::new(
        BoundingRect::new(0.0, 0.0, 100.0, 60.0),
        TimedPoint::new(Point2D::new(2.0, 30.0), 0.0),
        Point2D::new(98.0, 30.0),
        1.0,
        &config,
    ) {
        Ok(grid) => grid,
        Err(e) => {
            println!("Grid setup failed: {}", e);
            return;
        }
    };

    // uniform base weight, cheaper along a preferred airway
    let airway = Polygon::new(vec![
        Point2D::new(0.0, 26.0),
        Point2D::new(100.0, 26.0),
        Point2D::new(100.0, 34.0),
        Point2D::new(0.0, 34.0),
    ]);
    let cells = grid.grid().clone();
    let weights = grid.weights_mut();
    let setup = weights
        .fill(1.0)
        .and_then(|_| weights.set_weights_inside(&cells, &airway, 0.5));
    if let Err(e) = setup {
        println!("Weight setup failed: {}", e);
        return;
    }

    let storms: Vec<MovingPolygon> = (0..12).filter_map(|_| storm(&mut rng, &jitter)).collect();
    println!("Created {} storm cells", storms.len());
    let grid = grid.with_hazards(HazardSet::with_avoidance(storms));

    match grid.optimal_path_static() {
        Ok(outcome) => report("frozen weather", &grid, &outcome),
        Err(e) => println!("Static search failed: {}", e),
    }
    match grid.optimal_path() {
        Ok(outcome) => report("moving weather", &grid, &outcome),
        Err(e) => println!("Timed search failed: {}", e),
    }

    println!("Weather reroute finish!!");
}
