//! Contracts between the controller and the environment hosting it
//!
//! The controller never touches a renderer or an event source directly. A
//! [`HostSurface`] reports metrics, schedules frames and scans for layers; a
//! [`VisualEffectSink`] receives the computed effects.

use std::rc::Weak;

use serde::{Deserialize, Serialize};

use crate::registry::{Axis, LayerCategory};

/// Opaque handle to a frame callback scheduled by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Size information the host reports on demand
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    /// Total scrollable content length along the scroll axis
    pub content_extent: f64,
    /// Visible length along the scroll axis
    pub viewport_extent: f64,
    /// Visible length across the scroll axis
    pub viewport_width: f64,
}

impl Metrics {
    pub fn new(content_extent: f64, viewport_extent: f64, viewport_width: f64) -> Self {
        Self {
            content_extent,
            viewport_extent,
            viewport_width,
        }
    }

    /// Maximum scroll distance, never negative
    pub fn max_extent(&self) -> f64 {
        let extent = self.content_extent - self.viewport_extent;
        if extent.is_finite() {
            extent.max(0.0)
        } else {
            0.0
        }
    }
}

/// Content edge of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Start,
    End,
}

/// A parallax layer found while scanning the host
#[derive(Debug, Clone)]
pub struct LayerSpec<E> {
    pub element: Weak<E>,
    pub category: LayerCategory,
    /// Falls back to the category's default speed when absent
    pub speed: Option<f64>,
    pub axis: Axis,
}

impl<E> LayerSpec<E> {
    pub fn new(element: Weak<E>, category: LayerCategory) -> Self {
        Self {
            element,
            category,
            speed: None,
            axis: Axis::Vertical,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }
}

/// An element that plays a one-shot animation once scrolled into view
#[derive(Debug, Clone)]
pub struct RevealSpec<E> {
    pub element: Weak<E>,
    /// Offset of the element's leading edge from the start of the content
    pub offset: f64,
    /// Fraction of the viewport the element must cross; config default if absent
    pub threshold: Option<f64>,
    /// Animation name handed back to the sink
    pub animation: String,
}

impl<E> RevealSpec<E> {
    pub fn new(element: Weak<E>, offset: f64, animation: impl Into<String>) -> Self {
        Self {
            element,
            offset,
            threshold: None,
            animation: animation.into(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Everything a host scan found
#[derive(Debug, Clone)]
pub struct LayerScan<E> {
    pub layers: Vec<LayerSpec<E>>,
    pub reveals: Vec<RevealSpec<E>>,
}

impl<E> Default for LayerScan<E> {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            reveals: Vec::new(),
        }
    }
}

/// Input side of the host: metrics, frame scheduling and layer discovery
pub trait HostSurface {
    type Element;

    /// Current content and viewport sizes
    fn metrics(&self) -> Metrics;

    /// Schedule one frame callback before the next repaint
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a previously scheduled frame callback
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Collect every parallax layer and reveal element currently present
    fn scan(&self) -> LayerScan<Self::Element>;

    /// Stop delivering input to the controller
    fn detach_listeners(&mut self) {}
}

/// Output side of the host: where computed effects are written
pub trait VisualEffectSink<E> {
    fn apply_translation(&mut self, element: &E, x: f64, y: f64);

    fn apply_opacity_scale(&mut self, element: &E, opacity: f64, scale: f64);

    fn reveal(&mut self, _element: &E, _animation: &str) {}

    /// Put the element back the way it was before the controller touched it
    fn restore(&mut self, _element: &E) {}

    fn boundary_changed(&mut self, _edge: Edge, _reached: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_extent_never_negative() {
        assert_eq!(Metrics::new(3000.0, 800.0, 1200.0).max_extent(), 2200.0);
        assert_eq!(Metrics::new(500.0, 800.0, 1200.0).max_extent(), 0.0);
        assert_eq!(Metrics::new(f64::NAN, 800.0, 1200.0).max_extent(), 0.0);
    }
}
