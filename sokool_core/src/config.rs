use serde::{Deserialize, Serialize};

/// Tunable rules for the player agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Hit points the player starts every room with.
    pub max_hp: u32,
    /// Maximum number of place blocks the player can carry.
    pub max_blocks: u32,
    /// Place blocks carried when a room starts.
    pub starting_blocks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_hp: 3,
            max_blocks: 2,
            starting_blocks: 0,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom limits
    pub fn new(max_hp: u32, max_blocks: u32) -> Self {
        Self {
            max_hp,
            max_blocks,
            ..Default::default()
        }
    }
}
