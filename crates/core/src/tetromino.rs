//! Tetromino model - pivot, rotation, lock state and occupancy blocks
//!
//! An unlocked tetromino never stores cells: they are computed on demand from
//! its pivot and rotation through the shape tables. Once locked, its cells are
//! copied into the board's occupancy list as [`Block`]s carrying the parent id,
//! and the board becomes their owner.

use crate::shapes::{cells_at, ShapeCells};
use crate::types::{Point, Shape, Spin, TetrominoId, BLOCK_SIZE};

/// One occupied cell of a locked tetromino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub x: i32,
    pub y: i32,
    pub parent: TetrominoId,
}

impl Block {
    pub fn new(point: Point, parent: TetrominoId) -> Self {
        Self {
            x: point.x,
            y: point.y,
            parent,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Monotonic id source owned by a board, so separate sessions never share ids
#[derive(Debug, Clone)]
pub struct IdAllocator {
    /// Wider than an id so that handing out `u32::MAX` leaves it past the end
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Next unused id, or `None` once every `u32` id has been handed out
    pub fn allocate(&mut self) -> Option<TetrominoId> {
        let id = u32::try_from(self.next).ok()?;
        self.next += 1;
        Some(TetrominoId(id))
    }

    /// Guarantee future ids are greater than `id`
    pub fn reserve_past(&mut self, id: TetrominoId) {
        self.next = self.next.max(u64::from(id.0) + 1);
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A polyomino piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetromino {
    id: TetrominoId,
    shape: Shape,
    pivot: Point,
    rotation: u8,
    locked: bool,
    paused: bool,
    size: u32,
}

impl Tetromino {
    /// New unlocked piece with its pivot at `(left, 0)` and rotation 0
    pub fn new(id: TetrominoId, shape: Shape, left: i32) -> Self {
        Self {
            id,
            shape,
            pivot: Point::new(left, 0),
            rotation: 0,
            locked: false,
            paused: false,
            size: BLOCK_SIZE,
        }
    }

    /// Build from a seed id; unknown seeds produce the single-cell shape
    pub fn from_seed(id: TetrominoId, seed: u32, left: i32) -> Self {
        Self::new(id, Shape::from_seed(seed), left)
    }

    pub fn id(&self) -> TetrominoId {
        self.id
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn seed(&self) -> u32 {
        self.shape.seed()
    }

    pub fn class_name(&self) -> &'static str {
        self.shape.class_name()
    }

    pub fn left(&self) -> i32 {
        self.pivot.x
    }

    pub fn top(&self) -> i32 {
        self.pivot.y
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    /// Cells at the current pivot and rotation.
    ///
    /// For a locked piece the board's occupancy list is authoritative; use
    /// `Board::blocks_of` instead.
    pub fn blocks(&self) -> ShapeCells {
        cells_at(self.shape, self.rotation, self.pivot)
    }

    /// Cells the piece would cover after shifting by `(dx, dy)`
    pub fn blocks_shifted(&self, dx: i32, dy: i32) -> ShapeCells {
        cells_at(self.shape, self.rotation, self.pivot.offset(dx, dy))
    }

    /// Rotate without any geometry check.
    ///
    /// Used for pieces that are not on a board (preview, hold, snapshot
    /// restore). Pieces on a board rotate through `Board::rotate_tetromino`,
    /// which applies wall kicks.
    pub fn rotate(&mut self, spin: Spin) {
        if self.locked {
            return;
        }
        self.rotation = spin.apply(self.rotation, self.shape.rotation_states());
    }

    pub(crate) fn shift(&mut self, dx: i32, dy: i32) {
        self.pivot = self.pivot.offset(dx, dy);
    }

    pub(crate) fn set_placement(&mut self, rotation: u8, pivot: Point) {
        self.rotation = rotation % self.shape.rotation_states();
        self.pivot = pivot;
    }

    /// Back to the spawn orientation at `(left, 0)`
    pub(crate) fn reset_to_spawn(&mut self, left: i32) {
        self.pivot = Point::new(left, 0);
        self.rotation = 0;
        self.paused = false;
    }

    /// Returns `false` if the piece was already locked
    pub(crate) fn mark_locked(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        self.paused = false;
        true
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

/// Close vertical gaps between a locked piece's own remaining cells.
///
/// A cell falls one row at a time while the nearest cell of the same piece
/// below it, in the same column, is more than one row away and the cell below
/// is not `blocked` by another piece. Every step moves a cell down, so the
/// loop is bounded by the number of cells times the gap height. Returns
/// whether any cell moved.
pub fn collapse_blocks(cells: &mut [Point], blocked: impl Fn(Point) -> bool) -> bool {
    let mut moved = false;
    loop {
        let mut step = None;
        for (i, cell) in cells.iter().enumerate() {
            let nearest_below = cells
                .iter()
                .filter(|other| other.x == cell.x && other.y > cell.y)
                .map(|other| other.y)
                .min();
            if let Some(below) = nearest_below {
                let target = cell.offset(0, 1);
                if below - 1 > cell.y && !blocked(target) {
                    step = Some(i);
                    break;
                }
            }
        }
        match step {
            Some(i) => {
                cells[i].y += 1;
                moved = true;
            }
            None => return moved,
        }
    }
}
