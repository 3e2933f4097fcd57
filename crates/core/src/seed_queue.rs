//! Seed queue - FIFO of pending shape ids with a uniform random fallback
//!
//! Hosts (and tests) push explicit seeds to script the piece sequence. When the
//! queue runs dry, ids are drawn uniformly from [`SEED_POOL`] using a small
//! deterministic LCG so that a given RNG seed replays the same game.

use std::collections::VecDeque;

use crate::types::SEED_POOL;

/// Linear congruential generator (Numerical Recipes constants)
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would be a fixed point of the multiply step.
        Self {
            state: seed.max(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in `[0, max)`; uses the high bits, which have the longest period
    pub fn next_below(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Pending shape ids plus the random fallback pool
#[derive(Debug, Clone)]
pub struct SeedQueue {
    items: VecDeque<u32>,
    pool: [u32; 7],
    rng: SimpleRng,
}

impl SeedQueue {
    pub fn new(rng_seed: u32) -> Self {
        Self {
            items: VecDeque::new(),
            pool: SEED_POOL,
            rng: SimpleRng::new(rng_seed),
        }
    }

    /// Append ids to the back of the pending list
    pub fn enqueue(&mut self, seeds: impl IntoIterator<Item = u32>) {
        self.items.extend(seeds);
    }

    /// Pop the oldest pending id, or draw uniformly from the pool when empty
    pub fn dequeue(&mut self) -> u32 {
        if let Some(seed) = self.items.pop_front() {
            return seed;
        }
        let index = self.rng.next_below(self.pool.len() as u32) as usize;
        self.pool[index]
    }

    pub fn pending(&self) -> usize {
        self.items.len()
    }

    pub fn pool(&self) -> &[u32; 7] {
        &self.pool
    }

    /// Drop every pending id (the RNG keeps its state)
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for SeedQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
