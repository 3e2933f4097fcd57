//! Cascade Tetris (workspace facade crate).
//!
//! Re-exports the workspace members as `cascade_tetris::{core,input,term,types}`;
//! the implementation lives in dedicated crates under `crates/`.

pub use cascade_tetris_core as core;
pub use cascade_tetris_input as input;
pub use cascade_tetris_term as term;
pub use cascade_tetris_types as types;
