//! Time calculation utilities for the timeline
//!
//! Pure functions only: callers pass elapsed times in, nothing here reads a
//! clock.

use std::time::Duration;

/// Calculate animation progress (0.0 to 1.0) from elapsed time and duration
///
/// # Arguments
/// * `elapsed` - Time since the animation started
/// * `duration` - Total animation duration
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Fraction of the remaining distance to close over `dt`.
///
/// `rate` is expressed per `reference` frame. Compounding it over
/// `dt / reference` frames keeps motion identical across refresh rates and
/// never exceeds 1, however long the frame.
#[inline]
pub fn frame_fraction(rate: f64, dt: Duration, reference: Duration) -> f64 {
    if reference.is_zero() || rate <= 0.0 {
        return 0.0;
    }
    let rate = rate.min(1.0);
    let frames = dt.as_secs_f64() / reference.as_secs_f64();
    (1.0 - (1.0 - rate).powf(frames)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(Duration::ZERO, Duration::ZERO) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_clamps() {
        let total = Duration::from_millis(200);
        assert!((progress(Duration::from_millis(50), total) - 0.25).abs() < 1e-9);
        assert_eq!(progress(Duration::from_millis(400), total), 1.0);
    }

    #[test]
    fn test_frame_fraction_matches_rate_at_reference() {
        assert!((frame_fraction(0.07, FRAME, FRAME) - 0.07).abs() < 1e-9);
    }

    #[test]
    fn test_frame_fraction_is_refresh_rate_independent() {
        // Two 120 Hz frames close the same distance as one 60 Hz frame.
        let half = FRAME / 2;
        let one = frame_fraction(0.07, FRAME, FRAME);
        let step = frame_fraction(0.07, half, FRAME);
        let two = 1.0 - (1.0 - step) * (1.0 - step);
        assert!((one - two).abs() < 1e-9);
    }

    #[test]
    fn test_frame_fraction_bounds() {
        assert_eq!(frame_fraction(0.07, Duration::ZERO, FRAME), 0.0);
        assert_eq!(frame_fraction(0.0, FRAME, FRAME), 0.0);
        assert_eq!(frame_fraction(1.0, FRAME, FRAME), 1.0);
        assert!(frame_fraction(0.07, Duration::from_secs(10), FRAME) <= 1.0);
    }
}
