//! Overscroll guard for wheel and touch gestures
//!
//! The host asks before letting a gesture through. A gesture that pushes
//! past an edge the timeline already rests on is blocked so the host can
//! suppress its native rubber-band effect.

use crate::timeline::TimelineState;

/// What the host should do with the gesture that triggered the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// Let the host scroll natively
    Pass,
    /// Suppress the host's default handling
    Block,
}

impl InputDisposition {
    pub fn is_blocked(&self) -> bool {
        matches!(self, InputDisposition::Block)
    }
}

/// Positive deltas scroll toward the end of the content
pub fn wheel_disposition(state: &TimelineState, delta: f64) -> InputDisposition {
    let past_start = state.is_at_start() && delta < 0.0;
    let past_end = state.is_at_end() && delta > 0.0;
    if past_start || past_end {
        InputDisposition::Block
    } else {
        InputDisposition::Pass
    }
}

/// Tracks the finger position between touch-move events
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchTracker {
    last_y: Option<f64>,
}

impl TouchTracker {
    pub fn start(&mut self, y: f64) {
        self.last_y = Some(y);
    }

    pub fn end(&mut self) {
        self.last_y = None;
    }

    /// A finger moving up scrolls toward the end, like a positive wheel delta
    pub fn on_move(&mut self, state: &TimelineState, y: f64) -> InputDisposition {
        let Some(last) = self.last_y.replace(y) else {
            return InputDisposition::Pass;
        };
        wheel_disposition(state, last - y)
    }
}
