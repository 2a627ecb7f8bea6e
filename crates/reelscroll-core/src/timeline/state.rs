//! Authoritative scroll position model

use super::damping::damp;

/// Raw, target and current scroll positions plus the bounds they live in.
///
/// Every mutator keeps `0 <= target_position <= max_extent` and
/// `0 <= current_position <= max_extent`. Input handling writes the raw and
/// target values, frame ticks write the current value, and the settle timer
/// writes `is_settling`; nothing else mutates the state.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineState {
    raw_input: f64,
    target_position: f64,
    current_position: f64,
    max_extent: f64,
    is_at_start: bool,
    is_at_end: bool,
    is_settling: bool,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl TimelineState {
    /// Create a state resting at the start of a timeline of `max_extent`
    pub fn new(max_extent: f64) -> Self {
        let max_extent = sanitize_extent(max_extent);
        Self {
            raw_input: 0.0,
            target_position: 0.0,
            current_position: 0.0,
            max_extent,
            is_at_start: true,
            is_at_end: max_extent == 0.0,
            is_settling: false,
        }
    }

    /// Last observed host scroll offset, unclamped
    #[inline]
    pub fn raw_input(&self) -> f64 {
        self.raw_input
    }

    /// Damped, clamped position the view is easing toward
    #[inline]
    pub fn target_position(&self) -> f64 {
        self.target_position
    }

    /// Eased position consumed by every subscriber
    #[inline]
    pub fn current_position(&self) -> f64 {
        self.current_position
    }

    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.max_extent
    }

    #[inline]
    pub fn is_at_start(&self) -> bool {
        self.is_at_start
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.is_at_end
    }

    #[inline]
    pub fn is_at_edge(&self) -> bool {
        self.is_at_start || self.is_at_end
    }

    #[inline]
    pub fn is_settling(&self) -> bool {
        self.is_settling
    }

    /// Signed distance from current to target
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.target_position - self.current_position
    }

    /// Current position as a fraction of the extent (0 when nothing scrolls)
    pub fn progress(&self) -> f64 {
        if self.max_extent > 0.0 {
            (self.current_position / self.max_extent).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Record a host scroll offset and derive the damped target from it
    pub(crate) fn apply_input(&mut self, raw: f64, zone_width: f64, edge_epsilon: f64) {
        self.raw_input = raw;
        self.target_position = damp(raw, self.max_extent, zone_width);
        self.update_edges(edge_epsilon);
    }

    /// Override the target directly (programmatic jumps); clamped, not damped
    pub(crate) fn set_target(&mut self, target: f64, edge_epsilon: f64) {
        self.target_position = self.clamp(target);
        self.update_edges(edge_epsilon);
    }

    /// Set target and current together, without animation
    pub(crate) fn sync(&mut self, raw: f64, zone_width: f64, edge_epsilon: f64) {
        self.apply_input(raw, zone_width, edge_epsilon);
        self.current_position = self.target_position;
    }

    /// Only the frame tick calls this
    pub(crate) fn set_current(&mut self, current: f64) {
        self.current_position = self.clamp(current);
    }

    /// Only the settle timer calls this
    pub(crate) fn set_settling(&mut self, settling: bool) {
        self.is_settling = settling;
    }

    /// Adopt new bounds and re-clamp both positions immediately
    pub(crate) fn set_max_extent(&mut self, max_extent: f64, edge_epsilon: f64) {
        self.max_extent = sanitize_extent(max_extent);
        self.target_position = self.clamp(self.target_position);
        self.current_position = self.clamp(self.current_position);
        self.update_edges(edge_epsilon);
    }

    fn update_edges(&mut self, edge_epsilon: f64) {
        self.is_at_start = self.target_position <= edge_epsilon;
        self.is_at_end = self.target_position >= self.max_extent - edge_epsilon;
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, self.max_extent)
        }
    }
}

fn sanitize_extent(max_extent: f64) -> f64 {
    if max_extent.is_finite() {
        max_extent.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_rests_at_start() {
        let state = TimelineState::new(1000.0);
        assert!(state.is_at_start());
        assert!(!state.is_at_end());
        assert_eq!(state.current_position(), 0.0);
    }

    #[test]
    fn test_negative_extent_is_zero() {
        let state = TimelineState::new(-40.0);
        assert_eq!(state.max_extent(), 0.0);
        assert!(state.is_at_start() && state.is_at_end());
    }

    #[test]
    fn test_apply_input_damps_and_flags_edges() {
        let mut state = TimelineState::new(1000.0);

        state.apply_input(2000.0, 150.0, 1.0);
        assert_eq!(state.raw_input(), 2000.0);
        assert_eq!(state.target_position(), 1000.0);
        assert!(state.is_at_end());
        assert!(!state.is_at_start());

        state.apply_input(75.0, 150.0, 1.0);
        assert!((state.target_position() - 18.75).abs() < 1e-9);
        assert!(!state.is_at_start());
    }

    #[test]
    fn test_shrinking_extent_reclamps_positions() {
        let mut state = TimelineState::new(1000.0);
        state.sync(800.0, 0.0, 1.0);
        assert_eq!(state.current_position(), 800.0);

        state.set_max_extent(400.0, 1.0);
        assert_eq!(state.target_position(), 400.0);
        assert_eq!(state.current_position(), 400.0);
        assert!(state.is_at_end());
    }

    #[test]
    fn test_set_current_clamps() {
        let mut state = TimelineState::new(100.0);
        state.set_current(150.0);
        assert_eq!(state.current_position(), 100.0);
        state.set_current(f64::NAN);
        assert_eq!(state.current_position(), 0.0);
    }
}
