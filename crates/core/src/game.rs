//! Game session - board, scoring, history and the fall timer
//!
//! The host calls [`Game::update`] every frame with the elapsed time and
//! [`Game::apply_action`] for each input. Gravity uses a fixed-timestep
//! accumulator: one board tick per elapsed drop interval, where the interval
//! follows the current level.

use tracing::debug;

use crate::board::Board;
use crate::config::GameConfig;
use crate::events::BoardEvent;
use crate::history::HistoryManager;
use crate::scoring::{LevelChange, ScoreKeeper};
use crate::types::{Direction, GameAction, Spin};

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    scorer: ScoreKeeper,
    history: HistoryManager,
    fall_timer_ms: u32,
    last_level_change: Option<LevelChange>,
    /// Events seen since the host last drained them
    events: Vec<BoardEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            board: Board::from_config(&config),
            scorer: ScoreKeeper::new(),
            history: HistoryManager::new(config.history_capacity),
            fall_timer_ms: 0,
            last_level_change: None,
            events: Vec::new(),
            config,
        }
    }

    /// Spawn the first piece
    pub fn start(&mut self) {
        if self.board.active_id().is_none() && !self.board.is_animating() {
            self.board.spawn_tetromino();
        }
        self.pump_events();
    }

    /// Fresh board and score; the seed queue and id allocator carry on
    pub fn restart(&mut self) {
        debug!(score = self.scorer.score(), "restarting");
        self.board.reset();
        self.scorer.reset();
        self.history.clear();
        self.fall_timer_ms = 0;
        self.last_level_change = None;
        self.start();
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn score(&self) -> u32 {
        self.scorer.score()
    }

    pub fn level(&self) -> u32 {
        self.scorer.level()
    }

    pub fn lines(&self) -> u32 {
        self.scorer.lines()
    }

    pub fn is_paused(&self) -> bool {
        self.board.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.board.is_game_over()
    }

    pub fn last_level_change(&self) -> Option<LevelChange> {
        self.last_level_change
    }

    /// Current fall interval
    pub fn drop_interval_ms(&self) -> u32 {
        self.scorer.drop_interval_ms(self.config.base_drop_ms)
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance animations and gravity by `elapsed_ms`.
    ///
    /// Returns `true` when the board changed.
    pub fn update(&mut self, elapsed_ms: u32) -> bool {
        if self.board.is_game_over() {
            return false;
        }

        let was_animating = self.board.is_animating();
        self.board.advance(elapsed_ms);
        let mut changed = was_animating != self.board.is_animating();

        // Time spent animating never counts towards the next fall.
        if was_animating || self.board.is_animating() || self.board.is_paused() {
            self.fall_timer_ms = 0;
        } else {
            self.fall_timer_ms = self.fall_timer_ms.saturating_add(elapsed_ms);
            loop {
                let interval = self.drop_interval_ms();
                if self.fall_timer_ms < interval {
                    break;
                }
                self.fall_timer_ms -= interval;
                if !self.board.tick() {
                    self.fall_timer_ms = 0;
                    break;
                }
                changed = true;
                if self.board.is_animating() || self.board.is_game_over() {
                    self.fall_timer_ms = 0;
                    break;
                }
            }
        }

        self.pump_events();
        changed
    }

    /// Apply one player action. While paused only `Pause` and `Restart` work.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        let applied = match action {
            GameAction::Pause => self.board.pause_game(),
            GameAction::Restart => {
                self.restart();
                true
            }
            _ if self.board.is_paused() || self.board.is_game_over() => false,
            GameAction::MoveLeft => self.board.move_active(Direction::Left),
            GameAction::MoveRight => self.board.move_active(Direction::Right),
            GameAction::SoftDrop => {
                let moved = self.board.soft_drop();
                if moved {
                    self.fall_timer_ms = 0;
                }
                moved
            }
            GameAction::HardDrop => self.board.hard_drop().is_some(),
            GameAction::RotateCw => self.board.rotate_active(Spin::Clockwise),
            GameAction::RotateCcw => self.board.rotate_active(Spin::CounterClockwise),
            GameAction::Hold => self.board.hold(),
        };
        self.pump_events();
        applied
    }

    /// Feed board events to the scorer and snapshot the board after a lock
    fn pump_events(&mut self) {
        let events = self.board.drain_events();
        let mut locked = false;
        for event in &events {
            if let Some(change) = self.scorer.apply(event) {
                debug!(
                    old_level = change.old_level,
                    new_level = change.new_level,
                    "level changed"
                );
                self.last_level_change = Some(change);
            }
            if matches!(event, BoardEvent::Locked { .. }) {
                locked = true;
            }
        }
        if locked {
            self.history.take_snapshot(&self.board);
        }
        self.events.extend(events);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
