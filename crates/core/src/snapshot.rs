//! Board snapshots - point-in-time copies for diagnostics and replay
//!
//! A snapshot never shares state with the live board: blocks are copied by
//! value and carry only their parent's id. The JSON form uses camelCase keys:
//!
//! ```json
//! {
//!   "timestamp": 1700000000000,
//!   "occupiedPositions": [{ "x": 4, "y": 19, "parentId": 3 }],
//!   "activeTetromino": { "seed": 0, "left": 5, "top": 0, "rotation": 0,
//!                        "locked": false, "id": 4, "blocks": [{ "x": 5, "y": 0 }] },
//!   "nextTetromino": null,
//!   "holdTetromino": null,
//!   "canHoldPiece": true,
//!   "isAnimating": false
//! }
//! ```

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::tetromino::{Block, Tetromino};
use crate::types::{Point, Shape, Spin, TetrominoId};

/// Serialized form of a single piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TetrominoState {
    pub seed: u32,
    pub left: i32,
    pub top: i32,
    pub rotation: u8,
    pub locked: bool,
    pub id: TetrominoId,
    pub blocks: Vec<Point>,
}

impl TetrominoState {
    pub fn from_tetromino(tetromino: &Tetromino) -> Self {
        Self {
            seed: tetromino.seed(),
            left: tetromino.left(),
            top: tetromino.top(),
            rotation: tetromino.rotation(),
            locked: tetromino.is_locked(),
            id: tetromino.id(),
            blocks: tetromino.blocks().to_vec(),
        }
    }
}

/// An occupied cell, keyed to its parent by id only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBlock {
    pub x: i32,
    pub y: i32,
    pub parent_id: TetrominoId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub timestamp: u64,
    pub formatted_time: String,
    pub occupied_block_count: usize,
    pub has_active_tetromino: bool,
    pub has_next_tetromino: bool,
    pub has_hold_tetromino: bool,
    pub can_hold_piece: bool,
    pub is_animating: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub occupied_positions: Vec<SnapshotBlock>,
    pub active_tetromino: Option<TetrominoState>,
    pub next_tetromino: Option<TetrominoState>,
    pub hold_tetromino: Option<TetrominoState>,
    pub can_hold_piece: bool,
    pub is_animating: bool,
}

/// Board contents rebuilt from a snapshot, ready for [`Board::restore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredState {
    pub occupied: Vec<Block>,
    /// One locked piece per distinct parent id in `occupied`
    pub locked: Vec<Tetromino>,
    pub active: Option<Tetromino>,
    pub next: Option<Tetromino>,
    pub held: Option<Tetromino>,
    pub can_hold: bool,
    /// Taken between a clearing lock and the next spawn
    pub mid_line_clear: bool,
}

impl Default for RestoredState {
    fn default() -> Self {
        Self {
            occupied: Vec::new(),
            locked: Vec::new(),
            active: None,
            next: None,
            held: None,
            can_hold: true,
            mid_line_clear: false,
        }
    }
}

impl BoardSnapshot {
    /// Copy the board without touching it
    pub fn from_board(board: &Board) -> Self {
        Self {
            timestamp: now_millis(),
            occupied_positions: board
                .occupied()
                .iter()
                .map(|b| SnapshotBlock {
                    x: b.x,
                    y: b.y,
                    parent_id: b.parent,
                })
                .collect(),
            active_tetromino: board.active_tetromino().map(TetrominoState::from_tetromino),
            next_tetromino: board.next_tetromino().map(TetrominoState::from_tetromino),
            hold_tetromino: board.held_tetromino().map(TetrominoState::from_tetromino),
            can_hold_piece: board.can_hold(),
            is_animating: board.is_animating(),
        }
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        SnapshotMetadata {
            timestamp: self.timestamp,
            formatted_time: format_time(self.timestamp),
            occupied_block_count: self.occupied_positions.len(),
            has_active_tetromino: self.active_tetromino.is_some(),
            has_next_tetromino: self.next_tetromino.is_some(),
            has_hold_tetromino: self.hold_tetromino.is_some(),
            can_hold_piece: self.can_hold_piece,
            is_animating: self.is_animating,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Rebuild a piece at its saved seed, position and rotation.
    ///
    /// The rotation is reached by applying clockwise rotation steps from
    /// rotation 0, the same operator live play uses.
    pub fn restore_tetromino(state: &TetrominoState) -> Tetromino {
        let mut tetromino = Tetromino::from_seed(state.id, state.seed, state.left);
        tetromino.set_placement(0, Point::new(state.left, state.top));
        for _ in 0..state.rotation {
            tetromino.rotate(Spin::Clockwise);
        }
        tetromino.set_locked(state.locked);
        tetromino
    }

    /// Rebuild the full board contents.
    ///
    /// Occupied blocks are grouped by parent id into locked placeholder
    /// pieces; the parent's shape is not part of the snapshot.
    pub fn restored_state(&self) -> RestoredState {
        let mut locked: BTreeMap<TetrominoId, Tetromino> = BTreeMap::new();
        let occupied: Vec<Block> = self
            .occupied_positions
            .iter()
            .map(|b| {
                locked.entry(b.parent_id).or_insert_with(|| {
                    let mut parent = Tetromino::new(b.parent_id, Shape::Single, b.x);
                    parent.set_locked(true);
                    parent
                });
                Block::new(Point::new(b.x, b.y), b.parent_id)
            })
            .collect();

        RestoredState {
            occupied,
            locked: locked.into_values().collect(),
            active: self.active_tetromino.as_ref().map(Self::restore_tetromino),
            next: self.next_tetromino.as_ref().map(Self::restore_tetromino),
            held: self.hold_tetromino.as_ref().map(Self::restore_tetromino),
            can_hold: self.can_hold_piece,
            mid_line_clear: self.is_animating,
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `HH:MM:SS.mmm` in UTC
fn format_time(timestamp_ms: u64) -> String {
    let millis = timestamp_ms % 1000;
    let secs = timestamp_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00:00.000");
        // 1970-01-02 13:04:05.007
        assert_eq!(format_time(86_400_000 + 47_045_007), "13:04:05.007");
    }

    #[test]
    fn test_restore_replays_rotation() {
        let state = TetrominoState {
            seed: 0,
            left: 4,
            top: 7,
            rotation: 3,
            locked: false,
            id: TetrominoId(9),
            blocks: Vec::new(),
        };
        let piece = BoardSnapshot::restore_tetromino(&state);
        assert_eq!(piece.shape(), Shape::T);
        assert_eq!(piece.rotation(), 3);
        assert_eq!(piece.pivot(), Point::new(4, 7));
        assert_eq!(piece.id(), TetrominoId(9));
        assert!(!piece.is_locked());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let snapshot = BoardSnapshot::from_board(&Board::new(10, 20));
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"occupiedPositions\":[]"));
        assert!(json.contains("\"canHoldPiece\":true"));
        assert!(json.contains("\"activeTetromino\":null"));
        assert_eq!(BoardSnapshot::from_json(&json).unwrap(), snapshot);
    }
}
