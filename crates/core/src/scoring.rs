//! Scoring module - score, lines and level from board events
//!
//! The board only reports what happened. [`ScoreKeeper`] turns those reports
//! into totals:
//!
//! | Event | Points |
//! |-------|--------|
//! | soft-drop step | 10 |
//! | hard drop | 15 per row |
//! | lock | 5 |
//! | `n` rows in one pass | `n * (n + 1) * 50` |
//!
//! The level starts at 1 and rises every 2000 points; it selects the fall
//! interval from the level table.

use crate::events::BoardEvent;
use crate::types::{
    DROP_INTERVALS, DROP_INTERVAL_MIN_MS, LINE_CLEAR_BASE, POINTS_PER_LEVEL,
};

/// Points for clearing `lines` rows at once
pub fn line_clear_points(lines: u32) -> u32 {
    lines
        .saturating_mul(lines + 1)
        .saturating_mul(LINE_CLEAR_BASE)
}

/// Level reached at `score` (1-based)
pub fn level_for_score(score: u32) -> u32 {
    1 + score / POINTS_PER_LEVEL
}

/// Fall interval for a level, scaled from the 1000ms table to `base_ms`
pub fn drop_interval_ms(level: u32, base_ms: u32) -> u32 {
    let index = (level.max(1) - 1).min(DROP_INTERVALS.len() as u32 - 1) as usize;
    let scaled = u64::from(base_ms) * u64::from(DROP_INTERVALS[index]) / 1000;
    (scaled as u32).max(DROP_INTERVAL_MIN_MS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreKeeper {
    score: u32,
    lines: u32,
    level: u32,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self {
            score: 0,
            lines: 0,
            level: 1,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn drop_interval_ms(&self, base_ms: u32) -> u32 {
        drop_interval_ms(self.level, base_ms)
    }

    /// Fold one board event into the totals
    pub fn apply(&mut self, event: &BoardEvent) -> Option<LevelChange> {
        match *event {
            BoardEvent::Score { points } => self.add_points(points),
            BoardEvent::LinesCompleted { count } => {
                self.lines += count;
                self.add_points(line_clear_points(count))
            }
            _ => None,
        }
    }

    pub fn add_points(&mut self, points: u32) -> Option<LevelChange> {
        self.score = self.score.saturating_add(points);
        let new_level = level_for_score(self.score);
        if new_level == self.level {
            return None;
        }
        let change = LevelChange {
            old_level: self.level,
            new_level,
        };
        self.level = new_level;
        Some(change)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_points() {
        assert_eq!(line_clear_points(0), 0);
        assert_eq!(line_clear_points(1), 100);
        assert_eq!(line_clear_points(2), 300);
        assert_eq!(line_clear_points(3), 600);
        assert_eq!(line_clear_points(4), 1000);
    }

    #[test]
    fn test_level_for_score() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(1999), 1);
        assert_eq!(level_for_score(2000), 2);
        assert_eq!(level_for_score(9000), 5);
    }

    #[test]
    fn test_drop_interval_decreases_and_floors() {
        assert_eq!(drop_interval_ms(1, 1000), 1000);
        assert_eq!(drop_interval_ms(2, 1000), 800);
        assert_eq!(drop_interval_ms(1, 750), 750);
        assert_eq!(drop_interval_ms(9, 1000), 160);
        assert_eq!(drop_interval_ms(30, 1000), 160);
        assert_eq!(drop_interval_ms(9, 100), DROP_INTERVAL_MIN_MS);
        // Level 0 is treated as level 1.
        assert_eq!(drop_interval_ms(0, 1000), 1000);
    }

    #[test]
    fn test_keeper_reports_level_change() {
        let mut keeper = ScoreKeeper::new();
        assert_eq!(keeper.apply(&BoardEvent::Score { points: 1990 }), None);
        assert_eq!(keeper.apply(&BoardEvent::GameOver), None);

        let change = keeper.apply(&BoardEvent::Score { points: 10 });
        assert_eq!(
            change,
            Some(LevelChange {
                old_level: 1,
                new_level: 2
            })
        );
        assert_eq!(keeper.level(), 2);
    }

    #[test]
    fn test_keeper_counts_lines() {
        let mut keeper = ScoreKeeper::new();
        keeper.apply(&BoardEvent::LinesCompleted { count: 2 });
        keeper.apply(&BoardEvent::LinesCompleted { count: 1 });
        assert_eq!(keeper.lines(), 3);
        assert_eq!(keeper.score(), 400);

        keeper.reset();
        assert_eq!(keeper, ScoreKeeper::new());
    }
}
