//! Press/release gesture state machine.
//!
//! ```text
//!            press(lines > 0)
//!   Idle ────────────────────▶ Armed ──release(≤ window, lines > 0)──▶ Commit ─▶ Idle
//!    ▲                          │  │
//!    │   press(lines == 0)      │  └─release(> window) / release(lines == 0) / expire ─▶ Idle
//!    └──────────────────────────┘
//! ```
//!
//! A press always replaces whatever was armed before. The release carries its
//! own freshly computed line count; the press-time count only decides whether
//! to arm (and start visual feedback).

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingGesture {
    pub armed_at: Instant,
    pub decided_lines: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Armed(PendingGesture),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Idle,
    Armed(PendingGesture),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No gesture was armed.
    NotArmed,
    /// Released after the long-press window; treated as selection or drag.
    LongPress { elapsed: Duration },
    /// Released in time but the pointer no longer qualifies.
    Declined,
    Commit(u8),
}

#[derive(Debug, Clone)]
pub struct GestureMachine {
    state: GestureState,
    long_press: Duration,
}

impl GestureMachine {
    pub fn new(long_press: Duration) -> Self {
        Self {
            state: GestureState::Idle,
            long_press,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, GestureState::Armed(_))
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn press(&mut self, at: Instant, lines: u8) -> PressOutcome {
        if lines == 0 {
            self.state = GestureState::Idle;
            return PressOutcome::Idle;
        }
        let pending = PendingGesture {
            armed_at: at,
            decided_lines: lines,
        };
        self.state = GestureState::Armed(pending);
        PressOutcome::Armed(pending)
    }

    /// Resolve the armed gesture with the line count recomputed at release.
    /// Always leaves the machine idle.
    pub fn release(&mut self, at: Instant, lines: u8) -> ReleaseOutcome {
        let GestureState::Armed(pending) = std::mem::take(&mut self.state) else {
            return ReleaseOutcome::NotArmed;
        };
        let elapsed = at.saturating_duration_since(pending.armed_at);
        if elapsed > self.long_press {
            return ReleaseOutcome::LongPress { elapsed };
        }
        if lines == 0 {
            ReleaseOutcome::Declined
        } else {
            ReleaseOutcome::Commit(lines)
        }
    }

    /// Drop an armed gesture whose release never arrived within the window.
    /// Returns true when a gesture was discarded.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            GestureState::Armed(p) if now.saturating_duration_since(p.armed_at) > self.long_press => {
                self.state = GestureState::Idle;
                true
            }
            _ => false,
        }
    }
}
