use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{EntityId, Position};

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are not part of the room")]
    OutOfBounds { x: i32, y: i32 },
}

impl GridError {
    fn out_of_bounds(position: Position) -> Self {
        GridError::OutOfBounds {
            x: position.x,
            y: position.y,
        }
    }
}

/// Classification of whatever stands on a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OccupantKind {
    #[default]
    Empty,
    Wall,
    /// Where push blocks belong.
    Goal,
    /// The typical sokoban block, moved by walking into it.
    PushBlock,
    /// A block the player can pick up and place elsewhere.
    PlaceBlock,
    Enemy {
        id: EntityId,
        /// Set once the enemy failed to find a path to the player.
        stuck: bool,
    },
    Player,
}

impl OccupantKind {
    /// Solid occupants block entry.
    #[inline]
    pub fn is_solid(&self) -> bool {
        !matches!(self, OccupantKind::Empty | OccupantKind::Goal)
    }

    /// Whether path search treats this occupant as impassable.
    ///
    /// Agents are solid but do not block the search: enemies plan through
    /// each other and the player is the usual search target.
    #[inline]
    pub fn blocks_path(&self) -> bool {
        matches!(
            self,
            OccupantKind::Wall | OccupantKind::PushBlock | OccupantKind::PlaceBlock
        )
    }

    #[inline]
    pub fn is_enemy(&self) -> bool {
        matches!(self, OccupantKind::Enemy { .. })
    }

    /// Character used to draw this occupant.
    pub fn glyph(&self) -> char {
        match self {
            OccupantKind::Empty => ' ',
            OccupantKind::Wall => '#',
            OccupantKind::Goal => '.',
            OccupantKind::PushBlock => '$',
            OccupantKind::PlaceBlock => '%',
            OccupantKind::Enemy { stuck: false, .. } => '&',
            OccupantKind::Enemy { stuck: true, .. } => '*',
            OccupantKind::Player => '@',
        }
    }

    /// Human readable name, used in move rejections and logs.
    pub fn name(&self) -> &'static str {
        match self {
            OccupantKind::Empty => "empty",
            OccupantKind::Wall => "wall",
            OccupantKind::Goal => "goal",
            OccupantKind::PushBlock => "push block",
            OccupantKind::PlaceBlock => "place block",
            OccupantKind::Enemy { .. } => "enemy",
            OccupantKind::Player => "player",
        }
    }
}

/// An occupant stored at a grid coordinate.
///
/// `underfoot` holds the terrain the occupant is standing on. It is only
/// ever a non-solid occupant, so a wall or a block is never tucked away.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Occupant {
    pub kind: OccupantKind,
    pub position: Position,
    underfoot: Option<Box<Occupant>>,
}

impl Occupant {
    pub fn new(kind: OccupantKind) -> Self {
        Occupant {
            kind,
            position: Position::default(),
            underfoot: None,
        }
    }

    pub fn empty() -> Self {
        Occupant::new(OccupantKind::Empty)
    }

    /// Builds an occupant standing on `terrain`. Solid terrain is discarded.
    pub fn covering(kind: OccupantKind, terrain: Occupant) -> Self {
        let mut occupant = Occupant::new(kind);
        occupant.set_underfoot(terrain);
        occupant
    }

    /// The non-solid occupant hidden beneath this one, if any.
    pub fn underfoot(&self) -> Option<&Occupant> {
        self.underfoot.as_deref()
    }

    pub fn take_underfoot(&mut self) -> Option<Occupant> {
        self.underfoot.take().map(|boxed| *boxed)
    }

    // Plain empty space is not worth keeping: vacating with no underfoot
    // already reveals `Empty`.
    fn set_underfoot(&mut self, terrain: Occupant) {
        self.underfoot = match terrain.kind {
            OccupantKind::Empty => None,
            kind if kind.is_solid() => None,
            _ => Some(Box::new(terrain)),
        };
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }
}

/// The authoritative mapping from coordinates to occupants for one room.
///
/// Every coordinate in the room's coordinate set always has an occupant;
/// coordinates never assigned anything hold `Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: HashMap<Position, Occupant>,
    coordinates: HashSet<Position>,
    goals: Vec<Position>,
    width: i32,
    height: i32,
}

impl Grid {
    /// Creates a new grid with no playable coordinates.
    pub fn new() -> Self {
        Grid::default()
    }

    /// Adds `position` to the room's coordinate set, holding `Empty`.
    ///
    /// Adding a coordinate that is already part of the room leaves its
    /// occupant untouched.
    pub fn add_coordinate(&mut self, position: Position) {
        if self.coordinates.insert(position) {
            self.cells.insert(
                position,
                Occupant {
                    position,
                    ..Occupant::empty()
                },
            );
            self.width = self.width.max(position.x + 1);
            self.height = self.height.max(position.y + 1);
        }
    }

    /// Records `position` as a goal that must hold a push block.
    pub fn add_goal(&mut self, position: Position) -> Result<(), GridError> {
        self.ensure_valid(position)?;
        if !self.goals.contains(&position) {
            self.goals.push(position);
        }
        Ok(())
    }

    /// Width of the bounding box of the coordinate set.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height of the bounding box of the coordinate set.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Checks if the given coordinate is part of the room.
    #[inline]
    pub fn is_valid(&self, position: Position) -> bool {
        self.coordinates.contains(&position)
    }

    fn ensure_valid(&self, position: Position) -> Result<(), GridError> {
        if self.is_valid(position) {
            Ok(())
        } else {
            Err(GridError::out_of_bounds(position))
        }
    }

    pub fn coordinates(&self) -> &HashSet<Position> {
        &self.coordinates
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    /// Gets the occupant at the given coordinate.
    pub fn get(&self, position: Position) -> Result<&Occupant, GridError> {
        self.cells
            .get(&position)
            .ok_or(GridError::out_of_bounds(position))
    }

    pub fn get_mut(&mut self, position: Position) -> Result<&mut Occupant, GridError> {
        self.cells
            .get_mut(&position)
            .ok_or(GridError::out_of_bounds(position))
    }

    /// Shorthand for the kind of occupant at `position`.
    pub fn kind(&self, position: Position) -> Result<OccupantKind, GridError> {
        self.get(position).map(|occupant| occupant.kind)
    }

    /// Overwrites the occupant at `position`, returning the previous one.
    pub fn set(
        &mut self,
        position: Position,
        mut occupant: Occupant,
    ) -> Result<Occupant, GridError> {
        self.ensure_valid(position)?;
        occupant.position = position;
        self.cells
            .insert(position, occupant)
            .ok_or(GridError::out_of_bounds(position))
    }

    /// Clears `position` to `Empty`, discarding whatever stood there and
    /// anything it was standing on.
    pub fn remove(&mut self, position: Position) -> Result<Occupant, GridError> {
        self.set(position, Occupant::empty())
    }

    /// Takes the occupant off `position`, revealing its underfoot terrain
    /// (or `Empty` when it stood on nothing).
    pub fn vacate(&mut self, position: Position) -> Result<Occupant, GridError> {
        self.ensure_valid(position)?;
        let revealed = match self.get_mut(position)?.take_underfoot() {
            Some(terrain) => terrain,
            None => Occupant::empty(),
        };
        self.set(position, revealed)
    }

    /// Moves the occupant at `from` onto `to`.
    ///
    /// The terrain the mover stood on reappears at `from`. A non-solid
    /// target becomes the mover's new underfoot; a solid target is
    /// overwritten. Exactly `from` and `to` change.
    pub fn move_occupant(&mut self, from: Position, to: Position) -> Result<(), GridError> {
        self.ensure_valid(from)?;
        self.ensure_valid(to)?;
        if from == to {
            return Ok(());
        }

        let mut source = self.vacate(from)?;
        let target = self.remove(to)?;
        source.set_underfoot(target);
        self.set(to, source)?;
        Ok(())
    }

    /// True iff every goal coordinate currently holds a push block.
    pub fn goals_complete(&self) -> bool {
        self.goals
            .iter()
            .all(|goal| matches!(self.kind(*goal), Ok(OccupantKind::PushBlock)))
    }

    /// Positions and ids of all enemies, in row-major order.
    pub fn enemies(&self) -> Vec<(Position, EntityId)> {
        let mut enemies: Vec<(Position, EntityId)> = self
            .cells
            .iter()
            .filter_map(|(position, occupant)| match occupant.kind {
                OccupantKind::Enemy { id, .. } => Some((*position, id)),
                _ => None,
            })
            .collect();
        enemies.sort_by_key(|(position, _)| (position.y, position.x));
        enemies
    }
}
