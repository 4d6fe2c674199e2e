use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    config::GameConfig,
    map::Grid,
    pathfinding::{PathError, find_path},
};

/// Scalar state of the player agent.
///
/// Where the player stands is mirrored in the grid; everything else lives
/// only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Position,
    pub hp: u32,
    pub max_hp: u32,
    pub blocks: u32,
    pub max_blocks: u32,
    pub moves: u32,
    pub xp: u32,
}

impl PlayerState {
    pub fn new(position: Position, config: &GameConfig) -> Self {
        Self {
            position,
            hp: config.max_hp,
            max_hp: config.max_hp,
            blocks: config.starting_blocks.min(config.max_blocks),
            max_blocks: config.max_blocks,
            moves: 0,
            xp: 0,
        }
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    #[inline]
    pub fn can_carry_more(&self) -> bool {
        self.blocks < self.max_blocks
    }
}

/// What an enemy decided to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyPlan {
    /// No path to the player exists.
    Stuck,
    /// Nothing sensible to do, e.g. already on the player's coordinate.
    Wait,
    Step(Direction),
}

/// Plans one step for the enemy at `enemy` towards the player at `player`.
pub fn plan_enemy_step(grid: &Grid, enemy: Position, player: Position) -> EnemyPlan {
    let path = match find_path(grid, enemy, player) {
        Ok(path) => path,
        Err(PathError::NoPath { .. }) => return EnemyPlan::Stuck,
    };

    let Some(&next) = path.get(1) else {
        return EnemyPlan::Wait;
    };

    match Direction::between(enemy, next) {
        Some(direction) => EnemyPlan::Step(direction),
        None => {
            log::warn!("Path step from {enemy:?} to {next:?} is not adjacent");
            EnemyPlan::Wait
        }
    }
}
