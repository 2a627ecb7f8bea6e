//! Boundary damping
//!
//! Maps a raw scroll value onto the target position. Values are hard-clamped
//! into `[0, max_extent]` first; inside the zone next to either edge the
//! distance to that edge is scaled by `(distance / zone)²`, so the target
//! approaches the edge faster than linearly and never passes it.

/// Damp a raw scroll offset against the content bounds.
///
/// A non-positive or non-finite `zone_width` disables damping and leaves only
/// the hard clamp. When the two edge zones would overlap (`max_extent` smaller
/// than two zones) each zone shrinks to half the extent so the curve stays
/// continuous and monotone.
pub fn damp(raw: f64, max_extent: f64, zone_width: f64) -> f64 {
    let max_extent = if max_extent.is_finite() {
        max_extent.max(0.0)
    } else {
        0.0
    };
    let clamped = if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, max_extent)
    };

    if !(zone_width.is_finite() && zone_width > 0.0) || max_extent == 0.0 {
        return clamped;
    }

    let zone = zone_width.min(max_extent / 2.0);
    let from_start = clamped;
    let from_end = max_extent - clamped;

    if from_start < zone {
        let progress = from_start / zone;
        return clamped * progress * progress;
    }

    if from_end < zone {
        let progress = from_end / zone;
        return max_extent - from_end * progress * progress;
    }

    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_clamp() {
        assert_eq!(damp(0.0, 1000.0, 150.0), 0.0);
        assert_eq!(damp(-50.0, 1000.0, 150.0), 0.0);
        assert_eq!(damp(2000.0, 1000.0, 150.0), 1000.0);
        assert_eq!(damp(f64::INFINITY, 1000.0, 150.0), 1000.0);
        assert_eq!(damp(f64::NAN, 1000.0, 150.0), 0.0);
    }

    #[test]
    fn test_start_zone_is_quadratic() {
        assert!((damp(75.0, 1000.0, 150.0) - 18.75).abs() < 1e-9);
        assert!((damp(150.0, 1000.0, 150.0) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_zone_is_symmetric() {
        let near_start = damp(75.0, 1000.0, 150.0);
        let near_end = damp(925.0, 1000.0, 150.0);
        assert!((1000.0 - near_end - near_start).abs() < 1e-9);
    }

    #[test]
    fn test_identity_outside_zones() {
        assert_eq!(damp(500.0, 1000.0, 150.0), 500.0);
        assert_eq!(damp(850.0, 1000.0, 150.0), 850.0);
    }

    #[test]
    fn test_zone_disabled() {
        assert_eq!(damp(10.0, 1000.0, 0.0), 10.0);
        assert_eq!(damp(10.0, 1000.0, -5.0), 10.0);
        assert_eq!(damp(10.0, 1000.0, f64::NAN), 10.0);
    }

    #[test]
    fn test_overlapping_zones_keep_endpoints() {
        assert_eq!(damp(0.0, 100.0, 150.0), 0.0);
        assert_eq!(damp(100.0, 100.0, 150.0), 100.0);
        assert_eq!(damp(50.0, 100.0, 150.0), 50.0);
        assert!(damp(25.0, 100.0, 150.0) < 25.0);
        assert!(damp(75.0, 100.0, 150.0) > 75.0);
    }

    #[test]
    fn test_empty_extent() {
        assert_eq!(damp(300.0, 0.0, 150.0), 0.0);
        assert_eq!(damp(300.0, -10.0, 150.0), 0.0);
    }
}
