use std::rc::Rc;

use reelscroll_core::{
    Edge, FrameHandle, HostSurface, LayerScan, LayerSpec, Metrics, RevealSpec, VisualEffectSink,
};

use crate::scene::{Scene, SceneElement};

/// The terminal as a scroll host.
///
/// One terminal row is `units_per_row` scroll units. Frame requests are only
/// recorded here; the event loop fires them at the animation frame rate.
pub struct TerminalSurface {
    scene: Scene,
    viewport_rows: u16,
    viewport_cols: u16,
    units_per_row: f64,
    next_handle: u64,
    pending: Option<FrameHandle>,
    detached: bool,
}

impl TerminalSurface {
    pub fn new(scene: Scene, viewport_cols: u16, viewport_rows: u16, units_per_row: f64) -> Self {
        Self {
            scene,
            viewport_rows,
            viewport_cols,
            units_per_row: if units_per_row > 0.0 { units_per_row } else { 1.0 },
            next_handle: 0,
            pending: None,
            detached: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn units_per_row(&self) -> f64 {
        self.units_per_row
    }

    pub fn viewport_rows(&self) -> u16 {
        self.viewport_rows
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport_cols = cols;
        self.viewport_rows = rows;
    }

    /// Hand out the pending frame, if any; the caller must run it
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl HostSurface for TerminalSurface {
    type Element = SceneElement;

    fn metrics(&self) -> Metrics {
        Metrics::new(
            f64::from(self.scene.rows) * self.units_per_row,
            f64::from(self.viewport_rows) * self.units_per_row,
            f64::from(self.viewport_cols) * self.units_per_row,
        )
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn scan(&self) -> LayerScan<SceneElement> {
        let layers = self
            .scene
            .layers
            .iter()
            .map(|layer| LayerSpec {
                element: Rc::downgrade(&layer.element),
                category: layer.category,
                speed: layer.speed,
                axis: layer.axis,
            })
            .collect();
        let reveals = self
            .scene
            .reveals
            .iter()
            .map(|reveal| {
                RevealSpec::new(
                    Rc::downgrade(&reveal.element),
                    f64::from(reveal.element.row) * self.units_per_row,
                    reveal.animation.clone(),
                )
            })
            .collect();
        LayerScan { layers, reveals }
    }

    fn detach_listeners(&mut self) {
        self.detached = true;
    }
}

/// Writes effects straight into the scene elements
#[derive(Debug, Default)]
pub struct CellSink {
    pub at_start: bool,
    pub at_end: bool,
    pub last_reveal: Option<String>,
}

impl VisualEffectSink<SceneElement> for CellSink {
    fn apply_translation(&mut self, element: &SceneElement, x: f64, y: f64) {
        element.update(|p| {
            p.dx = x;
            p.dy = y;
        });
    }

    fn apply_opacity_scale(&mut self, element: &SceneElement, opacity: f64, scale: f64) {
        element.update(|p| {
            p.opacity = opacity;
            p.scale = scale;
        });
    }

    fn reveal(&mut self, element: &SceneElement, animation: &str) {
        element.update(|p| p.revealed = true);
        self.last_reveal = Some(format!("{} ({})", element.name, animation));
    }

    fn restore(&mut self, element: &SceneElement) {
        let revealed = element.presentation().revealed;
        element.update(|p| {
            *p = Default::default();
            p.revealed = revealed;
        });
    }

    fn boundary_changed(&mut self, edge: Edge, reached: bool) {
        match edge {
            Edge::Start => self.at_start = reached,
            Edge::End => self.at_end = reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_scale_with_rows() {
        let surface = TerminalSurface::new(Scene::festival(), 80, 40, 8.0);
        let metrics = surface.metrics();
        assert_eq!(metrics.content_extent, 140.0 * 8.0);
        assert_eq!(metrics.viewport_extent, 320.0);
        assert_eq!(metrics.max_extent(), 800.0);
    }

    #[test]
    fn test_scan_finds_every_element() {
        let surface = TerminalSurface::new(Scene::festival(), 80, 40, 8.0);
        let scan = surface.scan();
        assert_eq!(scan.layers.len(), surface.scene().layers.len());
        assert_eq!(scan.reveals.len(), 4);
        assert_eq!(scan.reveals[0].offset, 50.0 * 8.0);
    }

    #[test]
    fn test_take_frame_clears_pending() {
        let mut surface = TerminalSurface::new(Scene::festival(), 80, 40, 8.0);
        let handle = surface.request_frame();
        assert_eq!(surface.take_frame(), Some(handle));
        assert!(!surface.has_pending_frame());
    }

    #[test]
    fn test_sink_restore_keeps_reveal() {
        let element = SceneElement::new("lineup", 0, 0, &["LINEUP"], crate::scene::Paint::Body);
        let mut sink = CellSink::default();
        sink.apply_translation(&element, 0.0, -40.0);
        sink.reveal(&element, "slide-up");
        sink.restore(&element);

        let p = element.presentation();
        assert_eq!(p.dy, 0.0);
        assert!(p.revealed);
        assert_eq!(sink.last_reveal.as_deref(), Some("lineup (slide-up)"));
    }
}
