//! Board module - the simulation engine
//!
//! The board owns every piece in play and is the only writer of board state:
//!
//! - `occupied` is a flat arena of [`Block`]s, one per cell of every locked
//!   piece, each tagged with its parent id. It never holds two blocks at the
//!   same cell and never holds a block outside `[0, width) x [0, height)`.
//! - `tetrominoes` maps ids to pieces: the locked ones (whose cells live in
//!   `occupied`) plus at most one unlocked, active piece.
//! - `next` and `held` are off-board pieces. They are not in `tetrominoes`.
//!
//! # Lifecycle
//!
//! ```text
//! spawn -> (move / rotate)* -> lock -> line clear? -> [flash -> fade] -> spawn
//! ```
//!
//! While the line-clear animation runs, spawn, hold, pause and movement are
//! refused. The animation is driven by [`Board::advance`]; when its second
//! phase ends the next piece spawns.
//!
//! Every operation reports its outcome through its return value and records
//! the signals collaborators need (score, line clears, game over, ...) in an
//! outbox drained with [`Board::drain_events`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::events::BoardEvent;
use crate::seed_queue::SeedQueue;
use crate::shapes::{try_rotate, KickBias};
use crate::snapshot::RestoredState;
use crate::tetromino::{collapse_blocks, Block, IdAllocator, Tetromino};
use crate::timers::{AnimationTimers, Fired, LineClearPhase, TimerHandle};
use crate::types::{
    Direction, Point, Shape, Spin, TetrominoId, HARD_DROP_POINTS_PER_ROW, LOCK_POINTS,
    SOFT_DROP_POINTS,
};

#[derive(Debug, Clone)]
pub struct Board {
    width: i32,
    height: i32,
    block_size: u32,
    flash_ms: u32,
    fade_ms: u32,
    occupied: Vec<Block>,
    tetrominoes: BTreeMap<TetrominoId, Tetromino>,
    active: Option<TetrominoId>,
    next: Option<Tetromino>,
    held: Option<Tetromino>,
    seeds: SeedQueue,
    ids: IdAllocator,
    timers: AnimationTimers,
    animation: Option<LineClearPhase>,
    phase_timer: Option<TimerHandle>,
    /// Rows removed by the clear currently being animated
    clearing_rows: Vec<i32>,
    can_hold: bool,
    game_over: bool,
    events: Vec<BoardEvent>,
}

impl Board {
    /// Empty board with default timings and RNG seed
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_config(&GameConfig {
            width,
            height,
            ..GameConfig::default()
        })
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            block_size: config.block_size,
            flash_ms: config.flash_ms,
            fade_ms: config.fade_ms,
            occupied: Vec::new(),
            tetrominoes: BTreeMap::new(),
            active: None,
            next: None,
            held: None,
            seeds: SeedQueue::new(config.rng_seed),
            ids: IdAllocator::new(),
            timers: AnimationTimers::new(),
            animation: None,
            phase_timer: None,
            clearing_rows: Vec::new(),
            can_hold: true,
            game_over: false,
            events: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Pivot column for new pieces
    pub fn spawn_left(&self) -> i32 {
        self.width / 2
    }

    /// Blocks of every locked piece
    pub fn occupied(&self) -> &[Block] {
        &self.occupied
    }

    /// Locked pieces plus the active one, by id
    pub fn tetrominoes(&self) -> impl Iterator<Item = &Tetromino> {
        self.tetrominoes.values()
    }

    pub fn tetromino(&self, id: TetrominoId) -> Option<&Tetromino> {
        self.tetrominoes.get(&id)
    }

    /// Number of pieces on the board that are not locked
    pub fn unlocked_count(&self) -> usize {
        self.tetrominoes.values().filter(|t| !t.is_locked()).count()
    }

    pub fn active_id(&self) -> Option<TetrominoId> {
        self.active
    }

    pub fn active_tetromino(&self) -> Option<&Tetromino> {
        self.active.and_then(|id| self.tetrominoes.get(&id))
    }

    pub fn next_tetromino(&self) -> Option<&Tetromino> {
        self.next.as_ref()
    }

    pub fn held_tetromino(&self) -> Option<&Tetromino> {
        self.held.as_ref()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation_phase(&self) -> Option<LineClearPhase> {
        self.animation
    }

    pub fn clearing_rows(&self) -> &[i32] {
        &self.clearing_rows
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Whether the active piece is paused
    pub fn is_paused(&self) -> bool {
        self.active_tetromino().map_or(false, Tetromino::is_paused)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Script the upcoming shapes
    pub fn enqueue_seeds(&mut self, seeds: impl IntoIterator<Item = u32>) {
        self.seeds.enqueue(seeds);
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current cells of a piece: from the occupancy arena once locked,
    /// from its pivot and rotation otherwise
    pub fn blocks_of(&self, id: TetrominoId) -> Vec<Point> {
        match self.tetrominoes.get(&id) {
            Some(piece) if !piece.is_locked() => piece.blocks().to_vec(),
            Some(_) => self
                .occupied
                .iter()
                .filter(|b| b.parent == id)
                .map(Block::point)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Parent of the block at `p`, if any
    pub fn owner_at(&self, p: Point) -> Option<TetrominoId> {
        self.occupied
            .iter()
            .find(|b| b.x == p.x && b.y == p.y)
            .map(|b| b.parent)
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// `p` is on the board and not covered by a block of any piece other than `id`.
    ///
    /// Blocks are excluded by parent id, so a piece can never collide with itself.
    pub fn is_free_for(&self, p: Point, id: TetrominoId) -> bool {
        self.in_bounds(p)
            && !self
                .occupied
                .iter()
                .any(|b| b.parent != id && b.x == p.x && b.y == p.y)
    }

    fn fits(&self, cells: &[Point], id: TetrominoId) -> bool {
        cells.iter().all(|&p| self.is_free_for(p, id))
    }

    /// Rows the active piece would fall before landing
    pub fn landing_distance(&self) -> Option<i32> {
        let piece = self.active_tetromino()?;
        let mut distance = 0;
        while self.fits(&piece.blocks_shifted(0, distance + 1), piece.id()) {
            distance += 1;
        }
        Some(distance)
    }

    /// Move an unlocked piece one cell.
    ///
    /// Fails when any target cell is out of bounds or covered by another
    /// piece. A blocked downward move while the piece's top is row 0 raises
    /// game over.
    pub fn move_tetromino(&mut self, id: TetrominoId, direction: Direction) -> bool {
        if self.is_animating() || self.game_over {
            return false;
        }
        let Some(piece) = self.tetrominoes.get(&id) else {
            return false;
        };
        if piece.is_locked() || piece.is_paused() {
            return false;
        }

        let (dx, dy) = direction.delta();
        let top = piece.top();
        if self.fits(&piece.blocks_shifted(dx, dy), id) {
            if let Some(piece) = self.tetrominoes.get_mut(&id) {
                piece.shift(dx, dy);
            }
            return true;
        }

        if direction == Direction::Down && top == 0 {
            self.raise_game_over();
        }
        false
    }

    /// Rotate an unlocked piece, trying each wall kick in order
    pub fn rotate_tetromino(&mut self, id: TetrominoId, spin: Spin) -> bool {
        if self.is_animating() || self.game_over {
            return false;
        }
        let Some(piece) = self.tetrominoes.get(&id) else {
            return false;
        };
        if piece.is_locked() || piece.is_paused() {
            return false;
        }

        let placement = try_rotate(
            piece.shape(),
            piece.rotation(),
            piece.pivot(),
            spin,
            KickBias::away_from_wall(piece.left(), self.width),
            |p| self.is_free_for(p, id),
        );
        let Some((rotation, pivot)) = placement else {
            return false;
        };
        if let Some(piece) = self.tetrominoes.get_mut(&id) {
            piece.set_placement(rotation, pivot);
        }
        true
    }

    pub fn move_active(&mut self, direction: Direction) -> bool {
        match self.active {
            Some(id) => self.move_tetromino(id, direction),
            None => false,
        }
    }

    pub fn rotate_active(&mut self, spin: Spin) -> bool {
        match self.active {
            Some(id) => self.rotate_tetromino(id, spin),
            None => false,
        }
    }

    /// Player-driven move down; scores on success
    pub fn soft_drop(&mut self) -> bool {
        if !self.move_active(Direction::Down) {
            return false;
        }
        self.emit(BoardEvent::Score {
            points: SOFT_DROP_POINTS,
        });
        true
    }

    /// Drop the active piece as far as it goes, then lock it.
    ///
    /// Returns the distance travelled, or `None` if there was nothing to drop.
    pub fn hard_drop(&mut self) -> Option<u32> {
        if self.is_animating() || self.game_over || self.is_paused() {
            return None;
        }
        let id = self.active?;

        let mut distance = 0;
        while self.move_tetromino(id, Direction::Down) {
            distance += 1;
        }
        if self.game_over {
            return Some(distance);
        }

        if distance > 0 {
            self.emit(BoardEvent::Score {
                points: distance * HARD_DROP_POINTS_PER_ROW,
            });
            self.emit(BoardEvent::HardDrop { distance });
        }
        self.lock(id);
        Some(distance)
    }

    /// One gravity step: move the active piece down, locking it when it cannot fall.
    ///
    /// Returns `false` when nothing happened (no active piece, paused,
    /// animating or game over).
    pub fn tick(&mut self) -> bool {
        if self.is_animating() || self.game_over || self.is_paused() {
            return false;
        }
        let Some(id) = self.active else {
            return false;
        };
        if self.move_tetromino(id, Direction::Down) {
            return true;
        }
        if self.game_over {
            return true;
        }
        self.lock(id)
    }

    /// Freeze a piece in place. A second call is a no-op returning `false`.
    ///
    /// Locking the active piece runs line completion, then either starts the
    /// clear animation or spawns the next piece.
    pub fn lock(&mut self, id: TetrominoId) -> bool {
        let Some(piece) = self.tetrominoes.get_mut(&id) else {
            return false;
        };
        if !piece.mark_locked() {
            return false;
        }
        let cells = piece.blocks();
        self.occupied.extend(cells.iter().map(|&p| Block::new(p, id)));
        self.can_hold = true;

        debug!(%id, cells = ?cells.as_slice(), "tetromino locked");
        self.emit(BoardEvent::Score {
            points: LOCK_POINTS,
        });
        self.emit(BoardEvent::Locked {
            id,
            blocks: cells.to_vec(),
        });

        let was_active = self.active == Some(id);
        if was_active {
            self.active = None;
        }

        if self.complete_lines() > 0 {
            self.start_line_clear();
        } else if was_active {
            self.spawn_tetromino();
        }
        true
    }

    /// Promote the preview piece (or a fresh one) to active and refill the preview.
    ///
    /// Refused while animating, after game over, or while a piece is still
    /// active. A promoted piece that overlaps the stack ends the game instead.
    pub fn spawn_tetromino(&mut self) -> Option<TetrominoId> {
        if self.is_animating() || self.game_over || self.active.is_some() {
            return None;
        }

        let Some(piece) = self.next.take().or_else(|| self.create_tetromino()) else {
            self.raise_game_over();
            return None;
        };
        if let Some(preview) = self.create_tetromino() {
            let preview_id = preview.id();
            self.next = Some(preview);
            self.emit(BoardEvent::NextPreview { id: preview_id });
        }

        self.activate(piece)
    }

    /// Swap the active piece with the hold slot.
    ///
    /// Allowed once per lock cycle. The previously held piece becomes active,
    /// or the preview piece when the slot was empty.
    pub fn hold(&mut self) -> bool {
        if self.is_animating() || self.game_over || !self.can_hold || self.is_paused() {
            return false;
        }
        let Some(id) = self.active else {
            return false;
        };
        let Some(mut piece) = self.tetrominoes.remove(&id) else {
            return false;
        };
        self.active = None;
        piece.reset_to_spawn(self.spawn_left());

        let previous = self.held.replace(piece);
        self.can_hold = false;
        debug!(%id, "tetromino held");
        self.emit(BoardEvent::Held { id });

        match previous {
            Some(previous) => {
                self.activate(previous);
            }
            None => {
                self.spawn_tetromino();
            }
        }
        true
    }

    /// Toggle pause on the active piece. No-op while animating.
    pub fn pause_game(&mut self) -> bool {
        if self.is_animating() {
            return false;
        }
        let Some(piece) = self.active.and_then(|id| self.tetrominoes.get_mut(&id)) else {
            return false;
        };
        let paused = piece.toggle_pause();
        debug!(paused, "pause toggled");
        true
    }

    /// Advance the animation clock, firing any phase that comes due
    pub fn advance(&mut self, elapsed_ms: u32) {
        let deadline = self.timers.now_ms() + u64::from(elapsed_ms);
        while let Some(fired) = self.timers.fire_next(deadline) {
            self.finish_phase(fired);
        }
        self.timers.settle(deadline);
    }

    /// Clear all pieces and cancel pending animation timers
    pub fn reset(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.phase_timer = None;
        self.animation = None;
        self.clearing_rows.clear();
        self.tetrominoes.clear();
        self.occupied.clear();
        self.active = None;
        self.next = None;
        self.held = None;
        self.can_hold = true;
        self.game_over = false;

        debug!(cancelled, "board reset");
        self.emit(BoardEvent::Reset);
    }

    /// Replace the board contents with a restored state.
    ///
    /// Parents referenced by blocks but missing from `state.locked` get a
    /// locked placeholder piece. Future ids are allocated past every
    /// restored id. A state captured mid line clear skips the rest of the
    /// animation and spawns the next piece straight away.
    pub fn restore(&mut self, state: RestoredState) {
        self.reset();
        let RestoredState {
            occupied,
            locked,
            active,
            next,
            held,
            can_hold,
            mid_line_clear,
        } = state;

        for mut piece in locked {
            piece.set_locked(true);
            piece.set_size(self.block_size);
            self.ids.reserve_past(piece.id());
            self.tetrominoes.insert(piece.id(), piece);
        }
        for block in &occupied {
            self.ids.reserve_past(block.parent);
            self.tetrominoes.entry(block.parent).or_insert_with(|| {
                let mut placeholder = Tetromino::new(block.parent, Shape::Single, block.x);
                placeholder.set_locked(true);
                placeholder
            });
        }
        self.occupied = occupied;

        if let Some(mut piece) = active {
            let id = piece.id();
            piece.set_size(self.block_size);
            piece.set_locked(false);
            self.ids.reserve_past(id);
            self.tetrominoes.insert(id, piece);
            self.active = Some(id);
        }
        for piece in next.iter().chain(held.iter()) {
            self.ids.reserve_past(piece.id());
        }
        self.next = next;
        self.held = held;
        self.can_hold = can_hold;

        debug!(
            blocks = self.occupied.len(),
            pieces = self.tetrominoes.len(),
            mid_line_clear,
            "board restored"
        );
        if mid_line_clear && self.active.is_none() {
            self.spawn_tetromino();
        }
    }

    fn emit(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    fn raise_game_over(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        debug!("game over");
        self.emit(BoardEvent::GameOver);
    }

    /// `None` once the id space is used up
    fn create_tetromino(&mut self) -> Option<Tetromino> {
        let Some(id) = self.ids.allocate() else {
            warn!("tetromino ids exhausted");
            return None;
        };
        let mut piece = Tetromino::from_seed(id, self.seeds.dequeue(), self.spawn_left());
        piece.set_size(self.block_size);
        Some(piece)
    }

    fn activate(&mut self, mut piece: Tetromino) -> Option<TetrominoId> {
        piece.reset_to_spawn(self.spawn_left());
        let id = piece.id();
        if !self.fits(&piece.blocks(), id) {
            debug!(%id, "spawn position blocked");
            self.raise_game_over();
            return None;
        }

        debug!(%id, shape = piece.shape().as_str(), "tetromino spawned");
        self.tetrominoes.insert(id, piece);
        self.active = Some(id);
        self.emit(BoardEvent::Spawned { id });
        Some(id)
    }

    /// Remove completed rows and settle what is left, repeating while the
    /// settled stack completes new rows. Returns the total rows removed.
    fn complete_lines(&mut self) -> u32 {
        self.clearing_rows.clear();
        let mut total = 0;
        loop {
            let rows = self.find_completed_rows();
            let Some(&lowest) = rows.iter().max() else {
                break;
            };
            self.remove_rows(&rows);

            let count = rows.len() as u32;
            total += count;
            debug!(count, rows = ?rows, "lines completed");
            self.emit(BoardEvent::LinesCompleted { count });
            self.clearing_rows.extend_from_slice(&rows);

            self.collapse(lowest);
        }
        total
    }

    fn find_completed_rows(&self) -> Vec<i32> {
        let mut counts = vec![0i32; self.height.max(0) as usize];
        for block in &self.occupied {
            if let Some(count) = usize::try_from(block.y).ok().and_then(|y| counts.get_mut(y)) {
                *count += 1;
            }
        }
        counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count == self.width)
            .map(|(y, _)| y as i32)
            .collect()
    }

    fn remove_rows(&mut self, rows: &[i32]) {
        let touched: BTreeSet<TetrominoId> = self
            .occupied
            .iter()
            .filter(|b| rows.contains(&b.y))
            .map(|b| b.parent)
            .collect();
        self.occupied.retain(|b| !rows.contains(&b.y));

        for id in touched {
            if !self.occupied.iter().any(|b| b.parent == id) {
                self.tetrominoes.remove(&id);
                debug!(%id, "tetromino removed");
                self.emit(BoardEvent::Removed { id });
            }
        }
    }

    /// Settle pieces above the lowest cleared row until nothing moves
    fn collapse(&mut self, lowest_cleared: i32) {
        loop {
            let dropped = self.settle_pieces(lowest_cleared);
            let closed = self.close_piece_gaps();
            if !dropped && !closed {
                break;
            }
        }
    }

    /// Drop whole pieces, the ones that can fall farthest first
    fn settle_pieces(&mut self, lowest_cleared: i32) -> bool {
        let candidates: BTreeSet<TetrominoId> = self
            .occupied
            .iter()
            .filter(|b| b.y < lowest_cleared)
            .map(|b| b.parent)
            .collect();

        let mut drops: Vec<(i32, TetrominoId)> = candidates
            .into_iter()
            .map(|id| (self.max_drop(id), id))
            .filter(|&(distance, _)| distance > 0)
            .collect();
        drops.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut moved = false;
        for (_, id) in drops {
            // Pieces dropped earlier in this pass change what is below.
            let distance = self.max_drop(id);
            if distance == 0 {
                continue;
            }
            for block in self.occupied.iter_mut().filter(|b| b.parent == id) {
                block.y += distance;
            }
            moved = true;
        }
        moved
    }

    fn max_drop(&self, id: TetrominoId) -> i32 {
        let cells: Vec<Point> = self
            .occupied
            .iter()
            .filter(|b| b.parent == id)
            .map(Block::point)
            .collect();
        let mut distance = 0;
        while cells
            .iter()
            .all(|p| self.is_free_for(p.offset(0, distance + 1), id))
        {
            distance += 1;
        }
        distance
    }

    fn close_piece_gaps(&mut self) -> bool {
        let parents: BTreeSet<TetrominoId> = self.occupied.iter().map(|b| b.parent).collect();
        let mut moved = false;
        for id in parents {
            let mut cells: Vec<Point> = self
                .occupied
                .iter()
                .filter(|b| b.parent == id)
                .map(Block::point)
                .collect();
            let occupied = &self.occupied;
            let changed = collapse_blocks(&mut cells, |p| {
                occupied
                    .iter()
                    .any(|b| b.parent != id && b.x == p.x && b.y == p.y)
            });
            if !changed {
                continue;
            }
            for (block, cell) in self
                .occupied
                .iter_mut()
                .filter(|b| b.parent == id)
                .zip(cells)
            {
                block.y = cell.y;
            }
            moved = true;
        }
        moved
    }

    fn start_line_clear(&mut self) {
        self.animation = Some(LineClearPhase::Flashing);
        self.phase_timer = Some(self.timers.schedule(self.flash_ms, LineClearPhase::Flashing));
        self.emit(BoardEvent::AnimationPhase {
            phase: LineClearPhase::Flashing,
        });
    }

    fn finish_phase(&mut self, fired: Fired) {
        if self.phase_timer != Some(fired.handle) {
            return;
        }
        match fired.phase {
            LineClearPhase::Flashing => {
                self.animation = Some(LineClearPhase::Fading);
                self.phase_timer = Some(self.timers.schedule(self.fade_ms, LineClearPhase::Fading));
                self.emit(BoardEvent::AnimationPhase {
                    phase: LineClearPhase::Fading,
                });
            }
            LineClearPhase::Fading => {
                self.animation = None;
                self.phase_timer = None;
                self.clearing_rows.clear();
                debug!(at_ms = fired.at_ms, "line clear animation finished");
                self.emit(BoardEvent::AnimationFinished);
                self.spawn_tetromino();
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
