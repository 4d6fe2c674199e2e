use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod environment;
pub mod map;
pub mod pathfinding;

/// Unique identifier for agents living in a room.
pub type EntityId = usize;

/// Represents a 2D coordinate.
///
/// Coordinates are signed so that neighbours of the room edge can be
/// expressed; whether a coordinate is playable is decided by the room's
/// coordinate set, not by the type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns the coordinate one step away in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns the four axis-adjacent coordinates.
    pub fn neighbors(self) -> [Position; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    /// Returns manhattan distance between two positions
    pub fn manhattan_distance(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

/// One of the four cardinal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Up,
    Down,
    Right,
}

impl Direction {
    /// Neighbour generation order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::Right,
    ];

    /// Unit vector for this direction. `y` grows downwards.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }

    /// Converts a move between two adjacent positions into a direction.
    ///
    /// Returns `None` when the positions are not 4-adjacent.
    pub fn between(src: Position, dst: Position) -> Option<Direction> {
        match (dst.x - src.x, dst.y - src.y) {
            (-1, 0) => Some(Direction::Left),
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_between_agree() {
        let origin = Position::new(3, 3);
        for direction in Direction::ALL {
            let next = origin.step(direction);
            assert_eq!(origin.manhattan_distance(&next), 1);
            assert_eq!(Direction::between(origin, next), Some(direction));
        }
    }

    #[test]
    fn test_between_rejects_non_adjacent() {
        let origin = Position::new(0, 0);
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, Position::new(1, 1)), None);
        assert_eq!(Direction::between(origin, Position::new(2, 0)), None);
    }

    #[test]
    fn test_position_ordering_is_lexicographic() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(1, 0) < Position::new(1, 1));
    }
}
