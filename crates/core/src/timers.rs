//! Animation timers - cancellable one-shot timers on a virtual clock
//!
//! The board never sleeps or spawns threads. The host advances a millisecond
//! clock and the board fires whichever line-clear phases have come due, in due
//! order. Each scheduled phase has an owned [`TimerHandle`], so a reset can
//! cancel everything in flight before it ever fires.

use tracing::trace;

/// The two phases of the line-clear animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClearPhase {
    Flashing,
    Fading,
}

impl LineClearPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineClearPhase::Flashing => "flashing",
            LineClearPhase::Fading => "fading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u32);

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    /// The phase that just ended
    pub phase: LineClearPhase,
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TimerHandle,
    due_ms: u64,
    phase: LineClearPhase,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationTimers {
    now_ms: u64,
    next_handle: u32,
    pending: Vec<Scheduled>,
}

impl AnimationTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule the end of `phase` after `delay_ms`
    pub fn schedule(&mut self, delay_ms: u32, phase: LineClearPhase) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let due_ms = self.now_ms + delay_ms as u64;
        trace!(?handle, phase = phase.as_str(), due_ms, "timer scheduled");
        self.pending.push(Scheduled {
            handle,
            due_ms,
            phase,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.handle != handle);
        before != self.pending.len()
    }

    /// Drop every pending timer; returns how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        if cancelled > 0 {
            trace!(cancelled, "timers cancelled");
        }
        self.pending.clear();
        cancelled
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fire the earliest timer due at or before `deadline_ms`.
    ///
    /// The clock moves to the timer's due time, so anything scheduled while
    /// handling it is measured from that instant. Ties fire in scheduling
    /// order.
    pub fn fire_next(&mut self, deadline_ms: u64) -> Option<Fired> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= deadline_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle))
            .map(|(i, _)| i)?;

        let timer = self.pending.remove(index);
        self.now_ms = self.now_ms.max(timer.due_ms);
        trace!(handle = ?timer.handle, phase = timer.phase.as_str(), "timer fired");
        Some(Fired {
            handle: timer.handle,
            phase: timer.phase,
            at_ms: timer.due_ms,
        })
    }

    /// Move the clock forward to `now_ms` without firing anything
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
