//! Terminal presentation.
//!
//! Renders a [`core::Game`] into a character framebuffer and flushes it to the
//! terminal. The core stays free of I/O; this crate only reads it.

pub mod board_view;
pub mod fb;
pub mod renderer;

pub use cascade_tetris_core as core;
pub use cascade_tetris_types as types;

pub use board_view::{BoardView, Viewport};
pub use fb::{Cell, FrameBuffer, Style};
pub use renderer::{encode_changed_rows, TerminalRenderer};
