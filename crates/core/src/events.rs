//! Board events - what happened, in order
//!
//! Board operations are plain method calls with plain return values. Each one
//! also records the signals collaborators care about (score, line clears, game
//! over, preview and hold changes) in an outbox the host drains once per frame.

use crate::timers::LineClearPhase;
use crate::types::{Point, TetrominoId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Points earned by a soft drop, hard drop or lock
    Score { points: u32 },
    /// A hard drop travelled `distance` rows (only emitted when > 0)
    HardDrop { distance: u32 },
    /// A piece locked with these cells
    Locked { id: TetrominoId, blocks: Vec<Point> },
    /// One clearing pass removed `count` rows
    LinesCompleted { count: u32 },
    /// The stack reached the top
    GameOver,
    /// A piece became the active piece
    Spawned { id: TetrominoId },
    /// A piece entered the preview slot
    NextPreview { id: TetrominoId },
    /// A piece entered the hold slot
    Held { id: TetrominoId },
    /// A locked piece lost its last block
    Removed { id: TetrominoId },
    /// The line-clear animation entered `phase`
    AnimationPhase { phase: LineClearPhase },
    AnimationFinished,
    Reset,
}

impl BoardEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            BoardEvent::Score { .. } => "score",
            BoardEvent::HardDrop { .. } => "hardDrop",
            BoardEvent::Locked { .. } => "locked",
            BoardEvent::LinesCompleted { .. } => "linesCompleted",
            BoardEvent::GameOver => "gameOver",
            BoardEvent::Spawned { .. } => "spawned",
            BoardEvent::NextPreview { .. } => "nextPreview",
            BoardEvent::Held { .. } => "held",
            BoardEvent::Removed { .. } => "removed",
            BoardEvent::AnimationPhase { .. } => "animationPhase",
            BoardEvent::AnimationFinished => "animationFinished",
            BoardEvent::Reset => "reset",
        }
    }
}
