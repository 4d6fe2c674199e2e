use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use crate::{Position, map::Grid};

/// Represents the ways a path search can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("No path from {start:?} to {goal:?}")]
    NoPath { start: Position, goal: Position },
}

/// Cartesian distance between two coordinates.
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    dx.hypot(dy)
}

/// Traversal cost estimate: manhattan distance scaled by ten.
pub fn heuristic_cost_estimate(start: Position, goal: Position) -> f64 {
    10.0 * f64::from(start.manhattan_distance(&goal))
}

/// The axis-adjacent coordinates of `position` that belong to the room.
pub fn neighbors(grid: &Grid, position: Position) -> impl Iterator<Item = Position> + '_ {
    position
        .neighbors()
        .into_iter()
        .filter(move |neighbor| grid.is_valid(*neighbor))
}

// Min-heap entry: lowest f-score first, ties broken by lowest (x, y).
#[derive(Debug, Clone, Copy)]
struct PrioritizedItem {
    f_score: f64,
    position: Position,
}

impl Ord for PrioritizedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for PrioritizedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PrioritizedItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PrioritizedItem {}

/// A* search from `start` to `goal` over the 4-connected room.
///
/// Walls, push blocks and place blocks are impassable and are closed the
/// first time they are seen. Agents do not block the search. On success the
/// returned path runs from `start` to `goal`, both inclusive.
pub fn find_path(grid: &Grid, start: Position, goal: Position) -> Result<Vec<Position>, PathError> {
    let mut frontier = BinaryHeap::new();
    let mut open: HashSet<Position> = HashSet::new();
    let mut closed: HashSet<Position> = HashSet::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, f64> = HashMap::new();
    let mut f_score: HashMap<Position, f64> = HashMap::new();

    let start_f = heuristic_cost_estimate(start, goal);
    g_score.insert(start, 0.0);
    f_score.insert(start, start_f);
    open.insert(start);
    frontier.push(PrioritizedItem {
        f_score: start_f,
        position: start,
    });

    while let Some(PrioritizedItem {
        f_score: popped_f,
        position: current,
    }) = frontier.pop()
    {
        // Skip entries superseded by a cheaper approach.
        if !open.contains(&current) || f_score.get(&current) != Some(&popped_f) {
            continue;
        }

        if current == goal {
            return Ok(reconstruct_path(&came_from, start, goal));
        }

        open.remove(&current);
        closed.insert(current);

        let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

        for neighbor in neighbors(grid, current) {
            let blocked = grid
                .kind(neighbor)
                .map(|kind| kind.blocks_path())
                .unwrap_or(true);
            if blocked {
                closed.insert(neighbor);
                continue;
            }

            let tentative_g = current_g + distance(current, neighbor);
            let known_g = g_score.get(&neighbor).copied();

            if closed.contains(&neighbor) && known_g.is_none_or(|g| tentative_g >= g) {
                continue;
            }

            if !open.contains(&neighbor) || known_g.is_none_or(|g| tentative_g < g) {
                let neighbor_f = tentative_g + heuristic_cost_estimate(neighbor, goal);
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                f_score.insert(neighbor, neighbor_f);
                open.insert(neighbor);
                frontier.push(PrioritizedItem {
                    f_score: neighbor_f,
                    position: neighbor,
                });
            }
        }
    }

    Err(PathError::NoPath { start, goal })
}

/// Walks parent pointers back from `goal` and returns the start-to-goal path.
fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(previous) => {
                current = *previous;
                path.push(current);
            }
            None => break,
        }
    }
    path.reverse();
    path
}
