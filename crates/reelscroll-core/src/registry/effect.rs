//! Effect math: timeline position in, visual effect out

use crate::config::{LayerConfig, TextTuning};

use super::subscriber::{AppliedEffect, Axis, LayerCategory};

/// Compute the effect a subscriber should show at `current`.
///
/// Translating categories move by `current * speed * intensity`, against
/// the scroll direction. Text fades and grows with the fraction of one
/// viewport scrolled so far.
pub fn compute(
    category: LayerCategory,
    speed_factor: f64,
    axis: Axis,
    current: f64,
    viewport_extent: f64,
    layers: &LayerConfig,
) -> AppliedEffect {
    match category.tuning(layers) {
        Some(tuning) => {
            let offset = translation_offset(current, speed_factor, tuning.intensity);
            match axis {
                Axis::Vertical => AppliedEffect::Translation { x: 0.0, y: offset },
                Axis::Horizontal => AppliedEffect::Translation { x: offset, y: 0.0 },
            }
        }
        None => {
            let (opacity, scale) = text_fade(current, viewport_extent, &layers.text);
            AppliedEffect::OpacityScale { opacity, scale }
        }
    }
}

#[inline]
pub fn translation_offset(current: f64, speed_factor: f64, intensity: f64) -> f64 {
    let offset = current * speed_factor * intensity * -1.0;
    // Avoid handing -0.0 to sinks that format it.
    if offset == 0.0 {
        0.0
    } else {
        offset
    }
}

/// Opacity and scale for a text layer
pub fn text_fade(current: f64, viewport_extent: f64, text: &TextTuning) -> (f64, f64) {
    let p = if viewport_extent > 0.0 {
        (current / viewport_extent).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let opacity = (1.0 - p * text.opacity_falloff).max(text.min_opacity);
    let scale = text.base_scale + p * text.scale_gain;
    (opacity, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_translation() {
        let layers = LayerConfig::default();
        let effect = compute(LayerCategory::Background, 0.2, Axis::Vertical, 500.0, 800.0, &layers);
        match effect {
            AppliedEffect::Translation { x, y } => {
                assert_eq!(x, 0.0);
                assert!((y - (-50.0)).abs() < 1e-9);
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_horizontal_axis() {
        let layers = LayerConfig::default();
        let effect = compute(LayerCategory::Foreground, 0.5, Axis::Horizontal, 100.0, 800.0, &layers);
        assert_eq!(effect, AppliedEffect::Translation { x: -50.0, y: 0.0 });
    }

    #[test]
    fn test_negative_speed_moves_with_scroll() {
        assert!(translation_offset(100.0, -0.5, 1.0) > 0.0);
        assert_eq!(translation_offset(100.0, 0.0, 1.0).to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_text_fade_bounds() {
        let text = TextTuning::default();
        assert_eq!(text_fade(0.0, 800.0, &text), (1.0, 0.95));

        let (opacity, scale) = text_fade(400.0, 800.0, &text);
        assert!((opacity - 0.85).abs() < 1e-9);
        assert!((scale - 0.975).abs() < 1e-9);

        let (opacity, scale) = text_fade(5000.0, 800.0, &text);
        assert!((opacity - 0.8).abs() < 1e-9);
        assert!((scale - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_fade_with_empty_viewport() {
        let text = TextTuning::default();
        assert_eq!(text_fade(300.0, 0.0, &text), (1.0, 0.95));
    }
}
