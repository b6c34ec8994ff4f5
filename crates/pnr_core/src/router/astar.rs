//! A* search on the layered routing grid (§4.5.2 of the component design).
//!
//! State is `(x, y, layer)`. In-layer moves follow the layer's preferred
//! direction at cost 1; layer changes cost `VIA_COST` and additionally pay
//! a heavy `LAYER_COST` in the heuristic, which is not strictly admissible —
//! biasing the search to stay near the destination layer is worth more here
//! than optimality (see the design notes on heuristic admissibility).

use crate::config::Config;
use crate::data::{Direction, RoutingGrid};
use pnr_common::Point;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A single `(x, y, layer)` grid state.
type State = (i64, i64, usize);

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenEntry {
    f: f64,
    state: State,
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the lowest f-score first.
        other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds the lowest-cost path from `start` to `goal` on `grid`, treating
/// `own_pins` cells as always passable (free or not) on every layer and
/// every other occupied cell as an obstacle. Returns the sequence of grid
/// states visited, including both endpoints, or `None` if no path exists.
pub fn find_path(
    grid: &RoutingGrid,
    config: &Config,
    start: (Point, usize),
    goal: (Point, usize),
    own_pins: &HashSet<Point>,
) -> Option<Vec<State>> {
    let start_state: State = (start.0.x, start.0.y, start.1);
    let goal_state: State = (goal.0.x, goal.0.y, goal.1);

    if !grid.in_bounds(start_state.0, start_state.1) || !grid.in_bounds(goal_state.0, goal_state.1) {
        return None;
    }
    if start_state.2 >= grid.metal_layers.len() || goal_state.2 >= grid.metal_layers.len() {
        return None;
    }

    let mut g_score: HashMap<State, f64> = HashMap::new();
    let mut came_from: HashMap<State, State> = HashMap::new();
    let mut open = BinaryHeap::new();

    g_score.insert(start_state, 0.0);
    open.push(OpenEntry {
        f: heuristic(start_state, goal_state, config),
        state: start_state,
    });

    while let Some(OpenEntry { state: current, .. }) = open.pop() {
        if current == goal_state {
            return Some(reconstruct(&came_from, start_state, goal_state));
        }

        let current_g = *g_score.get(&current).unwrap_or(&f64::INFINITY);

        for (next, cost) in neighbors(grid, config, current, own_pins) {
            let tentative_g = current_g + cost;
            if tentative_g < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                g_score.insert(next, tentative_g);
                came_from.insert(next, current);
                open.push(OpenEntry {
                    f: tentative_g + heuristic(next, goal_state, config),
                    state: next,
                });
            }
        }
    }

    None
}

fn neighbors(grid: &RoutingGrid, config: &Config, state: State, own_pins: &HashSet<Point>) -> Vec<(State, f64)> {
    let (x, y, layer) = state;
    let mut out = Vec::with_capacity(3);

    let in_layer_free = |nx: i64, ny: i64, layer: usize| -> bool {
        grid.in_bounds(nx, ny)
            && (grid.metal_layers[layer].is_free(nx as usize, ny as usize) || own_pins.contains(&Point::new(nx, ny)))
    };

    match grid.metal_layers[layer].direction {
        Direction::Horizontal => {
            for nx in [x - 1, x + 1] {
                if in_layer_free(nx, y, layer) {
                    out.push(((nx, y, layer), 1.0));
                }
            }
        }
        Direction::Vertical => {
            for ny in [y - 1, y + 1] {
                if in_layer_free(x, ny, layer) {
                    out.push(((x, ny, layer), 1.0));
                }
            }
        }
    }

    for next_layer in [layer.wrapping_sub(1), layer + 1] {
        if next_layer >= grid.metal_layers.len() {
            continue;
        }
        if !grid.in_bounds(x, y) {
            continue;
        }
        let via_free = grid.is_via_free(x as usize, y as usize) || own_pins.contains(&Point::new(x, y));
        let dest_free = in_layer_free(x, y, next_layer);
        if via_free && dest_free {
            out.push(((x, y, next_layer), config.via_cost));
        }
    }

    out
}

fn heuristic(from: State, to: State, config: &Config) -> f64 {
    let dx = (from.0 - to.0).unsigned_abs() as f64;
    let dy = (from.1 - to.1).unsigned_abs() as f64;
    let dlayer = (from.2 as i64 - to.2 as i64).unsigned_abs() as f64;
    dx + dy + config.via_cost * dlayer + config.layer_cost * dlayer
}

fn reconstruct(came_from: &HashMap<State, State>, start: State, goal: State) -> Vec<State> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
