//! Terminal input module.
//!
//! Maps `crossterm` key events onto [`crate::types::GameAction`] through a
//! rebindable key table that can be saved to and loaded from JSON.

pub mod bindings;
pub mod map;

pub use cascade_tetris_types as types;

pub use bindings::{KeyBinding, KeyBindings};
pub use map::{handle_key_event, key_name, should_quit};
