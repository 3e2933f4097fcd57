//! Session configuration
//!
//! Defaults come from the shared constants; `from_env` lets a host override
//! any of them with `TETRIS_*` variables. Values that fail to parse are
//! ignored.

use std::env;
use std::str::FromStr;

use crate::types::{
    BASE_DROP_MS, BLOCK_SIZE, BOARD_HEIGHT, BOARD_WIDTH, HISTORY_CAPACITY, LINE_FADE_MS,
    LINE_FLASH_MS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub block_size: u32,
    /// Fall interval at level 1
    pub base_drop_ms: u32,
    pub flash_ms: u32,
    pub fade_ms: u32,
    pub history_capacity: usize,
    pub rng_seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            block_size: BLOCK_SIZE,
            base_drop_ms: BASE_DROP_MS,
            flash_ms: LINE_FLASH_MS,
            fade_ms: LINE_FADE_MS,
            history_capacity: HISTORY_CAPACITY,
            rng_seed: 1,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            width: env_or("TETRIS_WIDTH", defaults.width).max(4),
            height: env_or("TETRIS_HEIGHT", defaults.height).max(4),
            block_size: env_or("TETRIS_BLOCK_SIZE", defaults.block_size),
            base_drop_ms: env_or("TETRIS_DROP_MS", defaults.base_drop_ms).max(1),
            flash_ms: env_or("TETRIS_FLASH_MS", defaults.flash_ms),
            fade_ms: env_or("TETRIS_FADE_MS", defaults.fade_ms),
            history_capacity: env_or("TETRIS_HISTORY", defaults.history_capacity).max(1),
            rng_seed: env_or("TETRIS_SEED", defaults.rng_seed),
        }
    }

    /// Spawn column for this width
    pub fn spawn_left(&self) -> i32 {
        self.width / 2
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (10, 20));
        assert_eq!(config.spawn_left(), 5);
        assert_eq!(config.history_capacity, 50);
    }

    #[test]
    fn test_unparsable_env_falls_back() {
        assert_eq!(env_or("TETRIS_TEST_UNSET_VARIABLE", 7u32), 7);
    }
}
