//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no behaviour beyond conversions, so they can be
//! shared by the board engine, the key-binding table and the terminal view.
//!
//! # Board Geometry
//!
//! Default playfield dimensions:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 19 is the floor)
//! - **Spawn pivot**: `(width / 2, 0)`
//!
//! Both bounds are exclusive: a block at `y == height` or `x == width` is out of
//! bounds, never a valid bottom or right-most position.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host loop timestep (~60 FPS) |
//! | `BASE_DROP_MS` | 750 | Fall interval at level 1 |
//! | `LINE_FLASH_MS` | 120 | First phase of the line-clear animation |
//! | `LINE_FADE_MS` | 180 | Second phase of the line-clear animation |
//!
//! # Examples
//!
//! ```
//! use cascade_tetris_types::{Direction, GameAction, Shape, Spin};
//!
//! assert_eq!(Shape::from_seed(0), Shape::T);
//! assert_eq!(Shape::from_seed(42), Shape::Single);
//! assert_eq!(Shape::I.rotation_states(), 2);
//!
//! assert_eq!(Direction::Down.delta(), (0, 1));
//! assert_eq!(Spin::CounterClockwise.sign(), -1);
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const BOARD_WIDTH: i32 = 10;

/// Default board height in cells
pub const BOARD_HEIGHT: i32 = 20;

/// Default rendered block size (pixels in a browser, informational elsewhere)
pub const BLOCK_SIZE: u32 = 24;

/// Host loop timestep in milliseconds
pub const TICK_MS: u32 = 16;

/// Fall interval at level 1
pub const BASE_DROP_MS: u32 = 750;

/// Flash phase of the line-clear animation
pub const LINE_FLASH_MS: u32 = 120;

/// Fade phase of the line-clear animation
pub const LINE_FADE_MS: u32 = 180;

/// Points for each successful soft-drop step
pub const SOFT_DROP_POINTS: u32 = 10;

/// Points per row travelled by a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u32 = 15;

/// Points for locking a piece
pub const LOCK_POINTS: u32 = 5;

/// Line clear bonus base: clearing `n` rows at once scores `n * (n + 1) * base`
pub const LINE_CLEAR_BASE: u32 = 50;

/// Score needed per level
pub const POINTS_PER_LEVEL: u32 = 2000;

/// Fall intervals per level for a 1000ms base, index 0 = level 1.
///
/// Scaled by the configured base drop time.
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Absolute minimum fall interval
pub const DROP_INTERVAL_MIN_MS: u32 = 60;

/// Default number of snapshots kept by the history ring buffer
pub const HISTORY_CAPACITY: usize = 50;

/// Seed id of the single-cell test shape
pub const SINGLE_SEED: u32 = 1337;

/// Uniform fallback pool drawn from when no seed is queued
pub const SEED_POOL: [u32; 7] = [0, 1, 2, 3, 4, 5, 6];

/// The closed set of tetromino shapes.
///
/// Seeds 0-6 map to T, I, O, J, L, Z, S. `Single` is a one-cell shape used for
/// deterministic tests and as the fallback for unknown seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    T,
    I,
    O,
    J,
    L,
    Z,
    S,
    Single,
}

impl Shape {
    pub const ALL: [Shape; 8] = [
        Shape::T,
        Shape::I,
        Shape::O,
        Shape::J,
        Shape::L,
        Shape::Z,
        Shape::S,
        Shape::Single,
    ];

    /// Map a seed id to a shape. Unsupported ids fall back to [`Shape::Single`].
    pub fn from_seed(seed: u32) -> Self {
        match seed {
            0 => Shape::T,
            1 => Shape::I,
            2 => Shape::O,
            3 => Shape::J,
            4 => Shape::L,
            5 => Shape::Z,
            6 => Shape::S,
            _ => Shape::Single,
        }
    }

    /// Seed id that produces this shape
    pub fn seed(&self) -> u32 {
        match self {
            Shape::T => 0,
            Shape::I => 1,
            Shape::O => 2,
            Shape::J => 3,
            Shape::L => 4,
            Shape::Z => 5,
            Shape::S => 6,
            Shape::Single => SINGLE_SEED,
        }
    }

    /// Number of distinct rotation states
    pub fn rotation_states(&self) -> u8 {
        match self {
            Shape::O | Shape::Single => 1,
            Shape::I | Shape::S | Shape::Z => 2,
            Shape::T | Shape::J | Shape::L => 4,
        }
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        match self {
            Shape::Single => 1,
            _ => 4,
        }
    }

    /// Style class used by presentation collaborators
    pub fn class_name(&self) -> &'static str {
        match self {
            Shape::T => "tetromino tetromino-t",
            Shape::I => "tetromino tetromino-i",
            Shape::O => "tetromino tetromino-o",
            Shape::J => "tetromino tetromino-j",
            Shape::L => "tetromino tetromino-l",
            Shape::Z => "tetromino tetromino-z",
            Shape::S => "tetromino tetromino-s",
            Shape::Single => "tetromino",
        }
    }

    /// Parse shape from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_tetris_types::Shape;
    ///
    /// assert_eq!(Shape::from_str("t"), Some(Shape::T));
    /// assert_eq!(Shape::from_str("Single"), Some(Shape::Single));
    /// assert_eq!(Shape::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "t" => Some(Shape::T),
            "i" => Some(Shape::I),
            "o" => Some(Shape::O),
            "j" => Some(Shape::J),
            "l" => Some(Shape::L),
            "z" => Some(Shape::Z),
            "s" => Some(Shape::S),
            "single" => Some(Shape::Single),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::T => "t",
            Shape::I => "i",
            Shape::O => "o",
            Shape::J => "j",
            Shape::L => "l",
            Shape::Z => "z",
            Shape::S => "s",
            Shape::Single => "single",
        }
    }
}

/// Movement direction for a falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Cell offset `(dx, dy)`; `y` grows downward
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    pub fn sign(&self) -> i8 {
        match self {
            Spin::Clockwise => 1,
            Spin::CounterClockwise => -1,
        }
    }

    /// Advance a rotation index by one step in this direction, modulo `states`
    pub fn apply(&self, rotation: u8, states: u8) -> u8 {
        let states = states.max(1) as i16;
        (rotation as i16 + self.sign() as i16).rem_euclid(states) as u8
    }
}

/// A board cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Unique, monotonically assigned tetromino id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TetrominoId(pub u32);

impl fmt::Display for TetrominoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player verbs the host translates input into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down (scores soft-drop points)
    SoftDrop,
    /// Drop to the lowest valid position and lock
    HardDrop,
    /// Rotate clockwise
    RotateCw,
    /// Rotate counter-clockwise
    RotateCcw,
    /// Swap the active piece with the hold slot
    Hold,
    /// Toggle pause
    Pause,
    /// Start a fresh game
    Restart,
}

impl GameAction {
    /// Parse action from its camelCase name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("ROTATECCW"), Some(GameAction::RotateCcw));
    /// assert_eq!(GameAction::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_round_trip_for_every_shape() {
        for shape in Shape::ALL {
            assert_eq!(Shape::from_seed(shape.seed()), shape);
        }
    }

    #[test]
    fn unknown_seed_falls_back_to_single() {
        assert_eq!(Shape::from_seed(7), Shape::Single);
        assert_eq!(Shape::from_seed(u32::MAX), Shape::Single);
    }

    #[test]
    fn spin_wraps_in_both_directions() {
        assert_eq!(Spin::Clockwise.apply(3, 4), 0);
        assert_eq!(Spin::CounterClockwise.apply(0, 4), 3);
        assert_eq!(Spin::CounterClockwise.apply(0, 2), 1);
        assert_eq!(Spin::Clockwise.apply(0, 1), 0);
    }

    #[test]
    fn action_names_are_camel_case() {
        for action in [
            GameAction::MoveLeft,
            GameAction::MoveRight,
            GameAction::SoftDrop,
            GameAction::HardDrop,
            GameAction::RotateCw,
            GameAction::RotateCcw,
            GameAction::Hold,
            GameAction::Pause,
            GameAction::Restart,
        ] {
            assert_eq!(GameAction::from_str(action.as_str()), Some(action));
        }
    }
}
