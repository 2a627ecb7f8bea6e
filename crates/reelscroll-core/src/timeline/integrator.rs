//! Per-frame easing of the current position toward the target

use std::time::Duration;

use crate::config::TimelineConfig;

use super::state::TimelineState;
use super::timing::frame_fraction;

/// Smallest remaining distance treated as "arrived", whatever the config says
const MIN_STOP_THRESHOLD: f64 = 1e-6;

/// Integrator parameters, derived from a sanitized [`TimelineConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EasingParams {
    /// Fraction of the remaining distance closed per reference frame
    pub rate: f64,
    /// Multiplier on `rate` while the target rests on an edge
    pub boundary_multiplier: f64,
    pub stop_threshold: f64,
    pub snap_epsilon: f64,
    pub reference_frame: Duration,
    pub max_frame: Duration,
}

impl Default for EasingParams {
    fn default() -> Self {
        Self::from_config(&TimelineConfig::default())
    }
}

impl EasingParams {
    pub fn from_config(config: &TimelineConfig) -> Self {
        Self {
            rate: config.easing_rate,
            boundary_multiplier: config.boundary_damping,
            stop_threshold: config.stop_threshold,
            snap_epsilon: config.snap_epsilon,
            reference_frame: config.reference_frame(),
            max_frame: config.max_frame(),
        }
    }

    /// Same parameters with a different base rate
    pub fn with_rate(self, rate: f64) -> Self {
        Self { rate, ..self }
    }

    /// Rate for the state's current edge situation
    #[inline]
    pub fn effective_rate(&self, state: &TimelineState) -> f64 {
        if state.is_at_edge() {
            self.rate * self.boundary_multiplier
        } else {
            self.rate
        }
    }
}

/// Whether the scheduler should keep requesting frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Idle,
}

/// Advance `current_position` toward `target_position` by one frame of `dt`.
pub fn tick(state: &mut TimelineState, dt: Duration, params: &EasingParams) -> TickOutcome {
    let dt = dt.min(params.max_frame);
    let fraction = frame_fraction(params.effective_rate(state), dt, params.reference_frame);

    let previous = state.current_position();
    let diff = state.remaining();
    let mut next = previous + diff * fraction;

    if state.is_at_start() && next.abs() < params.snap_epsilon {
        next = 0.0;
    }
    if state.is_at_end() && (next - state.max_extent()).abs() < params.snap_epsilon {
        next = state.max_extent();
    }

    // Float absorption: the step no longer moves the value, so finish the move.
    if fraction > 0.0 && diff != 0.0 && next == previous {
        next = state.target_position();
    }

    state.set_current(next);

    let threshold = params.stop_threshold.max(MIN_STOP_THRESHOLD);
    if state.remaining().abs() > threshold || state.is_settling() {
        TickOutcome::Continue
    } else {
        TickOutcome::Idle
    }
}
