//! A* pathfinding over the battle grid
//!
//! Respects terrain costs and treats occupied cells as obstacles. A missing
//! path is an empty vector, not an error; callers treat it as "no move
//! available this turn".

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::map::coord::GridPoint;
use crate::map::grid::BattleGrid;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    point: GridPoint,
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: GridPoint, b: GridPoint) -> f32 {
    a.distance(&b).map(|d| d as f32).unwrap_or(f32::INFINITY)
}

/// Find a path from start to goal, inclusive of both endpoints.
///
/// Edge cost is the destination cell's terrain cost. Occupied cells are
/// impassable while planning, except the goal itself: chase paths may end on
/// a target's cell, and the mover stops short to attack once in range.
///
/// Returns an empty vector when no path exists.
pub fn find_path(grid: &BattleGrid, start: GridPoint, goal: GridPoint) -> Vec<GridPoint> {
    if !grid.contains(start) || !grid.contains(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPoint, GridPoint> = HashMap::new();
    let mut g_scores: HashMap<GridPoint, f32> = HashMap::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        point: start,
        f_cost: heuristic(start, goal),
    });

    while let Some(current) = open_set.pop() {
        if current.point == goal {
            return reconstruct_path(&came_from, current.point);
        }

        let current_g = *g_scores.get(&current.point).unwrap_or(&f32::INFINITY);

        for neighbor in grid.neighbors(current.point) {
            if grid.is_occupied(neighbor) && neighbor != goal {
                continue;
            }

            let move_cost = match grid.terrain_at(neighbor) {
                Some(terrain) => terrain.movement_cost(),
                None => continue,
            };
            if move_cost.is_infinite() {
                continue;
            }

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.point);
                g_scores.insert(neighbor, tentative_g);

                open_set.push(PathNode {
                    point: neighbor,
                    f_cost: tentative_g + heuristic(neighbor, goal),
                });
            }
        }
    }

    Vec::new() // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &HashMap<GridPoint, GridPoint>,
    mut current: GridPoint,
) -> Vec<GridPoint> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Total terrain cost along a path
pub fn path_cost(grid: &BattleGrid, path: &[GridPoint]) -> f32 {
    path.iter()
        .filter_map(|point| grid.terrain_at(*point))
        .map(|terrain| terrain.movement_cost())
        .sum()
}
