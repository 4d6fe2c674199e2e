use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, EntityId, Position,
    agent::{EnemyPlan, PlayerState, plan_enemy_step},
    config::GameConfig,
    map::{Grid, GridError, Occupant, OccupantKind},
};

/// Errors raised while building a room from its level text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Room has no playable coordinates")]
    Empty,
    #[error("Unknown room symbol '{symbol}' at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: i32, y: i32 },
    #[error("No player ('@') found in room")]
    NoPlayer,
    #[error("Multiple players ('@') found, second one at ({x}, {y})")]
    MultiplePlayers { x: i32, y: i32 },
    #[error("No rooms to play")]
    NoLevels,
    #[error("Room {number} is malformed: {source}")]
    Level {
        number: u32,
        #[source]
        source: Box<LoadError>,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Why a player action did not take effect. The turn does not advance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("Move to {target:?} rejected: {reason}")]
    InvalidMove { target: Position, reason: String },
    #[error("Already carrying the maximum of {max} blocks")]
    CapacityExceeded { max: u32 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl MoveError {
    fn invalid(target: Position, reason: impl Into<String>) -> Self {
        MoveError::InvalidMove {
            target,
            reason: reason.into(),
        }
    }
}

/// Represents actions the player can decide to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Walk one tile; walking into a place block picks it up, walking into
    /// a push block pushes it.
    Move(Direction),
    /// Drop a carried block on the adjacent tile.
    PlaceBlock(Direction),
}

/// Represents the outcome of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action was refused; nothing changed.
    Rejected(MoveError),
    Advanced,
    /// Every goal held a push block; the next room has been built.
    RoomComplete { completed: u32 },
    /// The last room was completed.
    Victory,
    /// The player ran out of hit points.
    Defeat,
}

/// Level data handed over by whoever reads room files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub number: u32,
    pub name: String,
    /// Rows of room symbols.
    pub layout: String,
}

/// Free text following a `;` in a room row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub position: Position,
    pub text: String,
}

/// A freshly built room.
#[derive(Debug, Clone)]
pub struct Room {
    pub grid: Grid,
    pub player_start: Position,
    pub annotations: Vec<Annotation>,
}

/// Builds a room from rows of symbols.
///
/// `@` player, `&` enemy, `#` wall, `%` place block, `$` push block,
/// `.` goal, space for empty floor. A `;` ends the playable part of its row.
pub fn load_room_from_string(layout: &str) -> Result<Room, LoadError> {
    let mut grid = Grid::new();
    let mut annotations = Vec::new();
    let mut player_start: Option<Position> = None;
    let mut next_entity_id: EntityId = 0;

    for (y, line) in layout.lines().enumerate() {
        let y = y as i32;
        for (x, (offset, symbol)) in line.char_indices().enumerate() {
            let position = Position::new(x as i32, y);
            let kind = match symbol {
                ';' => {
                    annotations.push(Annotation {
                        position,
                        text: line[offset..].to_string(),
                    });
                    break;
                }
                '@' => {
                    if player_start.is_some() {
                        return Err(LoadError::MultiplePlayers {
                            x: position.x,
                            y: position.y,
                        });
                    }
                    player_start = Some(position);
                    OccupantKind::Player
                }
                '&' => {
                    let id = next_entity_id;
                    next_entity_id += 1;
                    OccupantKind::Enemy { id, stuck: false }
                }
                '#' => OccupantKind::Wall,
                '%' => OccupantKind::PlaceBlock,
                '$' => OccupantKind::PushBlock,
                '.' => OccupantKind::Goal,
                ' ' => OccupantKind::Empty,
                unknown => {
                    return Err(LoadError::UnknownSymbol {
                        symbol: unknown,
                        x: position.x,
                        y: position.y,
                    });
                }
            };

            grid.add_coordinate(position);
            grid.set(position, Occupant::new(kind))?;
            if kind == OccupantKind::Goal {
                grid.add_goal(position)?;
            }
        }
    }

    if grid.coordinates().is_empty() {
        return Err(LoadError::Empty);
    }
    let player_start = player_start.ok_or(LoadError::NoPlayer)?;

    Ok(Room {
        grid,
        player_start,
        annotations,
    })
}

/// Everything that changes while playing through a set of rooms.
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: Grid,
    pub player: PlayerState,
    pub annotations: Vec<Annotation>,
    /// Accepted turns in the current room.
    pub turn: u64,
    config: GameConfig,
    levels: Vec<Level>,
    level_index: usize,
    won: bool,
}

impl GameState {
    /// Starts a game at the first of `levels`.
    ///
    /// Every level is parsed up front so malformed data is reported before
    /// play begins.
    pub fn new(levels: Vec<Level>, config: GameConfig) -> Result<Self, LoadError> {
        for level in &levels {
            load_room_from_string(&level.layout).map_err(|source| LoadError::Level {
                number: level.number,
                source: Box::new(source),
            })?;
        }
        let first = levels.first().ok_or(LoadError::NoLevels)?;
        let room = load_room_from_string(&first.layout)?;

        Ok(GameState {
            player: PlayerState::new(room.player_start, &config),
            grid: room.grid,
            annotations: room.annotations,
            turn: 0,
            config,
            levels,
            level_index: 0,
            won: false,
        })
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    fn build_room(&mut self) -> Result<(), LoadError> {
        let room = load_room_from_string(&self.levels[self.level_index].layout)?;
        self.grid = room.grid;
        self.annotations = room.annotations;
        self.player = PlayerState::new(room.player_start, &self.config);
        self.turn = 0;
        self.won = false;
        Ok(())
    }

    /// Rebuilds the current room from its level text.
    pub fn restart_room(&mut self) -> Result<(), LoadError> {
        info!("Restarting room {}", self.current_level().number);
        self.build_room()
    }

    /// Builds the next room. Returns `false` when there is none left.
    pub fn advance_room(&mut self) -> Result<bool, LoadError> {
        if self.level_index + 1 >= self.levels.len() {
            return Ok(false);
        }
        self.level_index += 1;
        self.build_room()?;
        info!(
            "Entering room {} ({})",
            self.current_level().number,
            self.current_level().name
        );
        Ok(true)
    }

    /// Runs one full turn: the player's action, then every enemy.
    pub fn step(&mut self, action: Action) -> Result<TurnOutcome, LoadError> {
        if self.won {
            return Ok(TurnOutcome::Victory);
        }
        if self.player.is_defeated() {
            return Ok(TurnOutcome::Defeat);
        }

        if let Err(err) = self.process_action(action) {
            debug!("Action {action:?} rejected: {err}");
            return Ok(TurnOutcome::Rejected(err));
        }
        self.turn += 1;

        if self.grid.goals_complete() {
            let completed = self.current_level().number;
            info!("Room {completed} complete in {} moves", self.player.moves);
            return if self.advance_room()? {
                Ok(TurnOutcome::RoomComplete { completed })
            } else {
                info!("All rooms complete");
                self.won = true;
                Ok(TurnOutcome::Victory)
            };
        }

        self.process_enemies();

        if self.player.is_defeated() {
            info!("Player defeated in room {}", self.current_level().number);
            return Ok(TurnOutcome::Defeat);
        }
        Ok(TurnOutcome::Advanced)
    }

    /// Applies a single player action without stepping the enemies.
    pub fn process_action(&mut self, action: Action) -> Result<(), MoveError> {
        match action {
            Action::Move(direction) => self.move_player(direction),
            Action::PlaceBlock(direction) => self.place_block(direction),
        }
    }

    fn move_player(&mut self, direction: Direction) -> Result<(), MoveError> {
        let current_pos = self.player.position;
        let target_pos = current_pos.step(direction);

        let target = self
            .grid
            .kind(target_pos)
            .map_err(|_| MoveError::invalid(target_pos, "outside the room"))?;

        match target {
            OccupantKind::Wall | OccupantKind::Enemy { .. } | OccupantKind::Player => {
                return Err(MoveError::invalid(
                    target_pos,
                    format!("blocked by {}", target.name()),
                ));
            }
            OccupantKind::PlaceBlock => {
                if !self.player.can_carry_more() {
                    return Err(MoveError::CapacityExceeded {
                        max: self.player.max_blocks,
                    });
                }
                // Picking the block up reveals whatever it was covering.
                self.grid.vacate(target_pos)?;
                self.player.blocks += 1;
            }
            OccupantKind::PushBlock => {
                let beyond_pos = target_pos.step(direction);
                match self.grid.kind(beyond_pos) {
                    Ok(beyond) if beyond.is_solid() => {
                        return Err(MoveError::invalid(
                            target_pos,
                            format!("push block is stuck against {}", beyond.name()),
                        ));
                    }
                    Ok(_) => self.grid.move_occupant(target_pos, beyond_pos)?,
                    Err(_) => {
                        return Err(MoveError::invalid(
                            target_pos,
                            "push block would leave the room",
                        ));
                    }
                }
            }
            OccupantKind::Empty | OccupantKind::Goal => {}
        }

        self.grid.move_occupant(current_pos, target_pos)?;
        self.player.position = target_pos;
        self.player.moves += 1;
        Ok(())
    }

    fn place_block(&mut self, direction: Direction) -> Result<(), MoveError> {
        let target_pos = self.player.position.step(direction);
        if self.player.blocks == 0 {
            return Err(MoveError::invalid(target_pos, "no blocks to place"));
        }

        let target = self
            .grid
            .kind(target_pos)
            .map_err(|_| MoveError::invalid(target_pos, "outside the room"))?;

        let terrain = match target {
            OccupantKind::Wall
            | OccupantKind::PushBlock
            | OccupantKind::PlaceBlock
            | OccupantKind::Player => {
                return Err(MoveError::invalid(
                    target_pos,
                    format!("cannot place a block on {}", target.name()),
                ));
            }
            OccupantKind::Enemy { id, .. } => {
                // The enemy is crushed; the block lands on its terrain.
                self.grid.vacate(target_pos)?;
                self.player.xp += 1;
                debug!("Enemy {id} crushed at {target_pos:?}");
                self.grid.remove(target_pos)?
            }
            OccupantKind::Empty | OccupantKind::Goal => self.grid.remove(target_pos)?,
        };

        self.grid.set(
            target_pos,
            Occupant::covering(OccupantKind::PlaceBlock, terrain),
        )?;
        self.player.blocks -= 1;
        self.player.moves += 1;
        Ok(())
    }

    /// Steps every enemy once, in row-major order of where they stood when
    /// the sweep began.
    ///
    /// Moves apply immediately, so a later enemy sees the effects of
    /// earlier ones in the same sweep.
    pub fn process_enemies(&mut self) {
        for (position, id) in self.grid.enemies() {
            // An earlier enemy may have lunged and vacated this cell.
            match self.grid.kind(position) {
                Ok(OccupantKind::Enemy { id: current, .. }) if current == id => {}
                _ => continue,
            }
            self.step_enemy(position, id);
        }
    }

    fn step_enemy(&mut self, position: Position, id: EntityId) {
        let direction = match plan_enemy_step(&self.grid, position, self.player.position) {
            EnemyPlan::Step(direction) => direction,
            EnemyPlan::Wait => return,
            EnemyPlan::Stuck => {
                if let Ok(occupant) = self.grid.get_mut(position) {
                    if let OccupantKind::Enemy { stuck, .. } = &mut occupant.kind {
                        if !*stuck {
                            debug!("Enemy {id} at {position:?} has no path to the player");
                        }
                        *stuck = true;
                    }
                }
                return;
            }
        };

        let target_pos = position.step(direction);
        match self.grid.kind(target_pos) {
            Ok(OccupantKind::Player) => {
                self.player.hp = self.player.hp.saturating_sub(1);
                debug!("Enemy {id} lunged at the player, hp now {}", self.player.hp);
                if let Err(err) = self.grid.vacate(position) {
                    debug!("Enemy {id} could not be removed: {err}");
                }
            }
            Ok(kind) if kind.is_solid() => {
                debug!("Enemy {id} blocked by {}", kind.name());
            }
            Ok(_) => {
                if let Err(err) = self.grid.move_occupant(position, target_pos) {
                    debug!("Enemy {id} failed to move: {err}");
                }
            }
            Err(err) => debug!("Enemy {id} planned off the room: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(number: u32, layout: &str) -> Level {
        Level {
            number,
            name: format!("room {number}"),
            layout: layout.to_string(),
        }
    }

    fn game(layout: &str) -> GameState {
        GameState::new(vec![level(1, layout)], GameConfig::default()).unwrap()
    }

    fn game_with(layout: &str, config: GameConfig) -> GameState {
        GameState::new(vec![level(1, layout)], config).unwrap()
    }

    fn kind_at(state: &GameState, x: i32, y: i32) -> OccupantKind {
        state.grid.kind(Position::new(x, y)).unwrap()
    }

    #[test]
    fn test_load_room_symbols() {
        let room = load_room_from_string("#@&%$. ").unwrap();
        let kinds: Vec<OccupantKind> = (0..7)
            .map(|x| room.grid.kind(Position::new(x, 0)).unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                OccupantKind::Wall,
                OccupantKind::Player,
                OccupantKind::Enemy {
                    id: 0,
                    stuck: false
                },
                OccupantKind::PlaceBlock,
                OccupantKind::PushBlock,
                OccupantKind::Goal,
                OccupantKind::Empty,
            ]
        );
        assert_eq!(room.player_start, Position::new(1, 0));
        assert_eq!(room.grid.goals(), &[Position::new(5, 0)]);
    }

    #[test]
    fn test_load_room_annotation_ends_row() {
        let room = load_room_from_string("#@.$ ;push it\n#####").unwrap();
        assert_eq!(
            room.annotations,
            vec![Annotation {
                position: Position::new(5, 0),
                text: ";push it".to_string(),
            }]
        );
        assert!(room.grid.is_valid(Position::new(4, 0)));
        assert!(!room.grid.is_valid(Position::new(5, 0)));
        assert!(room.grid.is_valid(Position::new(4, 1)));
    }

    #[test]
    fn test_load_room_errors() {
        assert_eq!(load_room_from_string("").unwrap_err(), LoadError::Empty);
        assert_eq!(load_room_from_string("  .").unwrap_err(), LoadError::NoPlayer);
        assert_eq!(
            load_room_from_string("@ @").unwrap_err(),
            LoadError::MultiplePlayers { x: 2, y: 0 }
        );
        assert_eq!(
            load_room_from_string("@\n x").unwrap_err(),
            LoadError::UnknownSymbol {
                symbol: 'x',
                x: 1,
                y: 1
            }
        );
    }

    #[test]
    fn test_new_game_rejects_malformed_level() {
        let err = GameState::new(
            vec![level(1, "@ ."), level(2, "@ ?")],
            GameConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Level { number: 2, .. }));
        assert_eq!(
            GameState::new(vec![], GameConfig::default()).unwrap_err(),
            LoadError::NoLevels
        );
    }

    #[test]
    fn test_push_block_onto_goal_then_into_wall() {
        let mut state = game("@.$.#");

        state.process_action(Action::Move(Direction::Right)).unwrap();
        assert_eq!(state.player.position, Position::new(1, 0));

        state.process_action(Action::Move(Direction::Right)).unwrap();
        assert_eq!(state.player.position, Position::new(2, 0));
        assert_eq!(kind_at(&state, 3, 0), OccupantKind::PushBlock);
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::Goal);

        let before = state.grid.clone();
        let err = state
            .process_action(Action::Move(Direction::Right))
            .unwrap_err();
        assert!(matches!(err, MoveError::InvalidMove { .. }));
        assert_eq!(state.player.position, Position::new(2, 0));
        assert_eq!(state.player.moves, 2);
        assert_eq!(state.grid, before);
        assert!(!state.grid.goals_complete());
    }

    #[test]
    fn test_push_block_out_of_room_is_rejected() {
        let mut state = game("@$");
        let before = state.grid.clone();
        assert!(state.process_action(Action::Move(Direction::Right)).is_err());
        assert_eq!(state.grid, before);
    }

    #[test]
    fn test_walls_and_enemies_block_the_player() {
        let mut state = game("#@&\n . ");
        assert!(state.process_action(Action::Move(Direction::Left)).is_err());
        assert!(state.process_action(Action::Move(Direction::Right)).is_err());
        assert!(state.process_action(Action::Move(Direction::Up)).is_err());
        assert_eq!(state.player.position, Position::new(1, 0));
        assert_eq!(state.player.moves, 0);
    }

    #[test]
    fn test_pick_up_place_blocks_until_full() {
        let config = GameConfig {
            max_blocks: 1,
            ..GameConfig::default()
        };
        let mut state = game_with("@%%.", config);

        state.process_action(Action::Move(Direction::Right)).unwrap();
        assert_eq!(state.player.blocks, 1);
        assert_eq!(state.player.position, Position::new(1, 0));
        assert_eq!(kind_at(&state, 0, 0), OccupantKind::Empty);

        assert_eq!(
            state.process_action(Action::Move(Direction::Right)),
            Err(MoveError::CapacityExceeded { max: 1 })
        );
        assert_eq!(state.player.position, Position::new(1, 0));
        assert_eq!(kind_at(&state, 2, 0), OccupantKind::PlaceBlock);
    }

    #[test]
    fn test_place_block_and_pick_it_back_up() {
        let config = GameConfig {
            starting_blocks: 1,
            ..GameConfig::default()
        };
        let mut state = game_with("@.", config);

        state
            .process_action(Action::PlaceBlock(Direction::Right))
            .unwrap();
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::PlaceBlock);
        assert_eq!(state.player.blocks, 0);
        assert_eq!(state.player.moves, 1);

        assert!(
            state
                .process_action(Action::PlaceBlock(Direction::Right))
                .is_err()
        );

        state.process_action(Action::Move(Direction::Right)).unwrap();
        assert_eq!(state.player.blocks, 1);
        state.process_action(Action::Move(Direction::Left)).unwrap();
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::Goal);
    }

    #[test]
    fn test_place_block_on_solid_is_rejected() {
        let config = GameConfig {
            starting_blocks: 2,
            ..GameConfig::default()
        };
        let mut state = game_with("#@$", config);
        assert!(
            state
                .process_action(Action::PlaceBlock(Direction::Left))
                .is_err()
        );
        assert!(
            state
                .process_action(Action::PlaceBlock(Direction::Right))
                .is_err()
        );
        assert!(
            state
                .process_action(Action::PlaceBlock(Direction::Up))
                .is_err()
        );
        assert_eq!(state.player.blocks, 2);
    }

    #[test]
    fn test_place_block_crushes_enemy() {
        let config = GameConfig {
            starting_blocks: 1,
            ..GameConfig::default()
        };
        let mut state = game_with("@&", config);
        state
            .process_action(Action::PlaceBlock(Direction::Right))
            .unwrap();
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::PlaceBlock);
        assert_eq!(state.player.xp, 1);
        assert!(state.grid.enemies().is_empty());
    }

    #[test]
    fn test_enemy_steps_towards_player() {
        let mut state = game("@    &");
        let path = crate::pathfinding::find_path(
            &state.grid,
            Position::new(5, 0),
            state.player.position,
        )
        .unwrap();
        assert_eq!(path.len() - 1, 5);

        state.process_enemies();
        assert!(kind_at(&state, 4, 0).is_enemy());
        assert_eq!(kind_at(&state, 5, 0), OccupantKind::Empty);
    }

    #[test]
    fn test_enemy_lunge_damages_player_and_removes_enemy() {
        let mut state = game("@&.");
        state.process_enemies();
        assert_eq!(state.player.hp, 2);
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::Empty);
        assert_eq!(kind_at(&state, 0, 0), OccupantKind::Player);
        assert!(state.grid.enemies().is_empty());
    }

    #[test]
    fn test_enemies_sweep_in_order() {
        let mut state = game("@ &&.");
        state.process_enemies();
        assert!(kind_at(&state, 1, 0).is_enemy());
        assert!(kind_at(&state, 2, 0).is_enemy());
        assert_eq!(kind_at(&state, 3, 0), OccupantKind::Empty);
    }

    #[test]
    fn test_enemy_steps_into_cell_vacated_by_lunge() {
        let mut state = game("@&&.");
        state.process_enemies();
        // The first lunges and is removed; the second steps into its cell.
        assert_eq!(state.player.hp, 2);
        assert!(kind_at(&state, 1, 0).is_enemy());
        assert_eq!(kind_at(&state, 2, 0), OccupantKind::Empty);
    }

    #[test]
    fn test_enemy_blocked_by_later_enemy_waits() {
        let mut state = game("&&@\n.  ");
        state.process_enemies();
        assert_eq!(
            kind_at(&state, 0, 0),
            OccupantKind::Enemy {
                id: 0,
                stuck: false
            }
        );
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::Empty);
        assert_eq!(state.player.hp, 2);
    }

    #[test]
    fn test_walled_off_enemy_gets_stuck() {
        let mut state = game("@.#&");
        state.process_enemies();
        assert_eq!(
            kind_at(&state, 3, 0),
            OccupantKind::Enemy {
                id: 0,
                stuck: true
            }
        );
        assert_eq!(kind_at(&state, 3, 0).glyph(), '*');
    }

    #[test]
    fn test_enemy_keeps_goal_underfoot() {
        let mut state = game("@ .&");
        state.process_enemies();
        state.process_enemies();
        assert!(kind_at(&state, 1, 0).is_enemy());
        assert_eq!(kind_at(&state, 2, 0), OccupantKind::Goal);
    }

    #[test]
    fn test_step_runs_enemies_after_player() {
        let mut state = game("@    &\n.     ");
        assert_eq!(
            state.step(Action::Move(Direction::Right)).unwrap(),
            TurnOutcome::Advanced
        );
        assert_eq!(state.turn, 1);
        assert!(kind_at(&state, 4, 0).is_enemy());
    }

    #[test]
    fn test_rejected_step_does_not_move_enemies() {
        let mut state = game("@    &\n.     ");
        let outcome = state.step(Action::Move(Direction::Left)).unwrap();
        assert!(matches!(outcome, TurnOutcome::Rejected(_)));
        assert_eq!(state.turn, 0);
        assert!(kind_at(&state, 5, 0).is_enemy());
    }

    #[test]
    fn test_defeat_is_sticky() {
        let config = GameConfig {
            max_hp: 1,
            ..GameConfig::default()
        };
        let mut state = game_with("@ & \n.   ", config);
        assert_eq!(
            state.step(Action::Move(Direction::Right)).unwrap(),
            TurnOutcome::Defeat
        );
        assert!(state.player.is_defeated());
        assert_eq!(
            state.step(Action::Move(Direction::Down)).unwrap(),
            TurnOutcome::Defeat
        );
    }

    #[test]
    fn test_completing_rooms() {
        let mut state = GameState::new(
            vec![level(1, "@$."), level(4, " @$.")],
            GameConfig::default(),
        )
        .unwrap();

        state.process_action(Action::Move(Direction::Left)).unwrap_err();
        assert_eq!(
            state.step(Action::Move(Direction::Right)).unwrap(),
            TurnOutcome::RoomComplete { completed: 1 }
        );
        assert_eq!(state.current_level().number, 4);
        assert_eq!(state.player.position, Position::new(1, 0));
        assert_eq!(state.player.moves, 0);
        assert_eq!(state.turn, 0);

        assert_eq!(
            state.step(Action::Move(Direction::Right)).unwrap(),
            TurnOutcome::Victory
        );
        assert!(state.is_won());
        assert_eq!(
            state.step(Action::Move(Direction::Left)).unwrap(),
            TurnOutcome::Victory
        );
    }

    #[test]
    fn test_restart_after_victory_resumes_play() {
        let mut state = game("@$.  ");
        assert_eq!(
            state.step(Action::Move(Direction::Right)).unwrap(),
            TurnOutcome::Victory
        );

        state.restart_room().unwrap();
        assert!(!state.is_won());
        assert!(matches!(
            state.step(Action::Move(Direction::Down)).unwrap(),
            TurnOutcome::Rejected(_)
        ));
        assert_eq!(
            state.step(Action::Move(Direction::Right)).unwrap(),
            TurnOutcome::Victory
        );
    }

    #[test]
    fn test_restart_room_rebuilds_layout() {
        let mut state = game("@$ .");
        state.step(Action::Move(Direction::Right)).unwrap();
        assert_eq!(kind_at(&state, 2, 0), OccupantKind::PushBlock);

        state.restart_room().unwrap();
        assert_eq!(kind_at(&state, 1, 0), OccupantKind::PushBlock);
        assert_eq!(state.player.position, Position::new(0, 0));
        assert_eq!(state.player.moves, 0);
    }
}
