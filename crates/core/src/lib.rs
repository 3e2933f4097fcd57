//! Core simulation - pure, deterministic, and testable
//!
//! This crate contains the board engine and everything it needs. It has no
//! dependency on terminals, files or clocks: time only moves when the host
//! calls [`Board::advance`] or [`Game::update`].
//!
//! # Module Structure
//!
//! - [`seed_queue`]: FIFO of scripted shape ids with a uniform random fallback
//! - [`shapes`]: per-shape rotation tables and the wall-kick search
//! - [`tetromino`]: pieces, occupancy blocks, the id allocator, intra-piece collapse
//! - [`board`]: collision, locking, line clearing and cascading collapse, spawn and hold
//! - [`timers`]: cancellable line-clear animation phases on a virtual clock
//! - [`events`]: the signals the board records for collaborators
//! - [`snapshot`] / [`history`]: diagnostic copies of the board and a bounded history
//! - [`scoring`]: score, lines and level derived from board events
//! - [`game`]: a playable session tying the above to a fall timer
//! - [`config`]: session configuration with environment overrides
//!
//! # Example
//!
//! ```
//! use cascade_tetris_core::{Board, BoardEvent};
//! use cascade_tetris_core::types::Direction;
//!
//! let mut board = Board::new(10, 20);
//! board.enqueue_seeds([2]); // O piece
//! board.spawn_tetromino();
//!
//! assert!(board.move_active(Direction::Left));
//! assert_eq!(board.hard_drop(), Some(18));
//!
//! let events = board.drain_events();
//! assert!(events.contains(&BoardEvent::HardDrop { distance: 18 }));
//! assert_eq!(board.occupied().len(), 4);
//! ```

pub use cascade_tetris_types as types;

pub mod board;
pub mod config;
pub mod events;
pub mod game;
pub mod history;
pub mod scoring;
pub mod seed_queue;
pub mod shapes;
pub mod snapshot;
pub mod tetromino;
pub mod timers;

pub use board::Board;
pub use config::GameConfig;
pub use events::BoardEvent;
pub use game::Game;
pub use history::HistoryManager;
pub use scoring::{drop_interval_ms, level_for_score, line_clear_points, LevelChange, ScoreKeeper};
pub use seed_queue::{SeedQueue, SimpleRng};
pub use shapes::{cells_at, try_rotate, KickBias, ShapeCells, WALL_KICKS};
pub use snapshot::{BoardSnapshot, RestoredState, SnapshotBlock, SnapshotMetadata, TetrominoState};
pub use tetromino::{collapse_blocks, Block, IdAllocator, Tetromino};
pub use timers::{AnimationTimers, LineClearPhase, TimerHandle};
