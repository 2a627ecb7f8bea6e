//! Headless host for replaying scripted scroll sessions
//!
//! A [`Script`] describes a page (content and viewport sizes, layers, reveal
//! elements) and a list of timed input events. [`run_script`] replays it
//! against a [`TimelineController`] at a fixed frame cadence and records
//! what the timeline and every layer looked like on each frame.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::controller::TimelineController;
use crate::registry::{AppliedEffect, Axis, LayerCategory};
use crate::surface::{
    Edge, FrameHandle, HostSurface, LayerScan, LayerSpec, Metrics, RevealSpec, VisualEffectSink,
};
use crate::{Error, Result};

/// A named element living on the simulated page
#[derive(Debug)]
pub struct SimElement {
    name: String,
}

impl SimElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct SimLayer {
    element: Rc<SimElement>,
    category: LayerCategory,
    speed: Option<f64>,
    axis: Axis,
}

#[derive(Debug)]
struct SimReveal {
    element: Rc<SimElement>,
    offset: f64,
    threshold: Option<f64>,
    animation: String,
}

/// In-memory [`HostSurface`]: owns its elements and hands out frame handles
/// that the caller fires by hand.
#[derive(Debug)]
pub struct SimulatedSurface {
    metrics: Metrics,
    layers: Vec<SimLayer>,
    reveals: Vec<SimReveal>,
    next_handle: u64,
    pending: Option<FrameHandle>,
    frames_requested: u64,
    detached: bool,
}

impl SimulatedSurface {
    pub fn new(content_extent: f64, viewport_extent: f64, viewport_width: f64) -> Self {
        Self {
            metrics: Metrics::new(content_extent, viewport_extent, viewport_width),
            layers: Vec::new(),
            reveals: Vec::new(),
            next_handle: 0,
            pending: None,
            frames_requested: 0,
            detached: false,
        }
    }

    pub fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
    }

    /// Add a parallax layer the next scan will find
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        category: LayerCategory,
        speed: Option<f64>,
        axis: Axis,
    ) -> Rc<SimElement> {
        let element = Rc::new(SimElement::new(name));
        self.layers.push(SimLayer {
            element: Rc::clone(&element),
            category,
            speed,
            axis,
        });
        element
    }

    pub fn add_reveal(
        &mut self,
        name: impl Into<String>,
        offset: f64,
        threshold: Option<f64>,
        animation: impl Into<String>,
    ) -> Rc<SimElement> {
        let element = Rc::new(SimElement::new(name));
        self.reveals.push(SimReveal {
            element: Rc::clone(&element),
            offset,
            threshold,
            animation: animation.into(),
        });
        element
    }

    /// Drop every element called `name`. Returns false if none existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.layers.len() + self.reveals.len();
        self.layers.retain(|l| l.element.name() != name);
        self.reveals.retain(|r| r.element.name() != name);
        before != self.layers.len() + self.reveals.len()
    }

    /// Hand out the frame the controller is waiting for; the caller fires it
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl HostSurface for SimulatedSurface {
    type Element = SimElement;

    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        self.frames_requested += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn scan(&self) -> LayerScan<SimElement> {
        LayerScan {
            layers: self
                .layers
                .iter()
                .map(|l| LayerSpec {
                    element: Rc::downgrade(&l.element),
                    category: l.category,
                    speed: l.speed,
                    axis: l.axis,
                })
                .collect(),
            reveals: self
                .reveals
                .iter()
                .map(|r| RevealSpec {
                    element: Rc::downgrade(&r.element),
                    offset: r.offset,
                    threshold: r.threshold,
                    animation: r.animation.clone(),
                })
                .collect(),
        }
    }

    fn detach_listeners(&mut self) {
        self.detached = true;
    }
}

/// [`VisualEffectSink`] that remembers the latest effect per element name
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub effects: BTreeMap<String, AppliedEffect>,
    pub reveals: Vec<(String, String)>,
    pub restored: Vec<String>,
    pub boundaries: Vec<(Edge, bool)>,
    pub writes: u64,
}

impl VisualEffectSink<SimElement> for RecordingSink {
    fn apply_translation(&mut self, element: &SimElement, x: f64, y: f64) {
        self.writes += 1;
        self.effects
            .insert(element.name().to_string(), AppliedEffect::Translation { x, y });
    }

    fn apply_opacity_scale(&mut self, element: &SimElement, opacity: f64, scale: f64) {
        self.writes += 1;
        self.effects.insert(
            element.name().to_string(),
            AppliedEffect::OpacityScale { opacity, scale },
        );
    }

    fn reveal(&mut self, element: &SimElement, animation: &str) {
        self.reveals
            .push((element.name().to_string(), animation.to_string()));
    }

    fn restore(&mut self, element: &SimElement) {
        self.effects.remove(element.name());
        self.restored.push(element.name().to_string());
    }

    fn boundary_changed(&mut self, edge: Edge, reached: bool) {
        self.boundaries.push((edge, reached));
    }
}

// ----------------------------------------------------------------------
// Scripts
// ----------------------------------------------------------------------

/// A scripted scroll session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub content_extent: f64,
    pub viewport_extent: f64,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    /// Simulated time span; defaults to two seconds past the last event
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub layers: Vec<ScriptLayer>,
    #[serde(default)]
    pub reveals: Vec<ScriptReveal>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptLayer {
    pub name: String,
    pub category: LayerCategory,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub axis: Axis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReveal {
    pub name: String,
    pub offset: f64,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default = "default_animation")]
    pub animation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// Input the script feeds to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// The host scroll offset jumps to `position` (may overshoot the bounds)
    Scroll { position: f64 },
    /// A wheel notch; moves the clamped host offset unless the guard blocks it
    Wheel { delta: f64 },
    Resize {
        #[serde(default)]
        content_extent: Option<f64>,
        #[serde(default)]
        viewport_extent: Option<f64>,
        #[serde(default)]
        viewport_width: Option<f64>,
    },
    ScrollTo {
        target: f64,
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Pause,
    Resume,
    RemoveLayer { name: String },
    Destroy,
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_animation() -> String {
    "fade-in".to_string()
}

impl Script {
    /// Load a script, picking the format from the file extension
    /// (`.json` for JSON, anything else for TOML)
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let script: Script = toml::from_str(content).map_err(|e| Error::Script(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("content_extent", self.content_extent),
            ("viewport_extent", self.viewport_extent),
            ("viewport_width", self.viewport_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Script(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Total simulated time
    pub fn duration(&self) -> Duration {
        let ms = self.duration_ms.unwrap_or_else(|| {
            self.events
                .iter()
                .map(|e| e.at_ms)
                .max()
                .unwrap_or(0)
                .saturating_add(2_000)
        });
        Duration::from_millis(ms)
    }

    /// Build the page this script describes
    pub fn surface(&self) -> SimulatedSurface {
        let mut surface =
            SimulatedSurface::new(self.content_extent, self.viewport_extent, self.viewport_width);
        for layer in &self.layers {
            surface.add_layer(layer.name.clone(), layer.category, layer.speed, layer.axis);
        }
        for reveal in &self.reveals {
            surface.add_reveal(
                reveal.name.clone(),
                reveal.offset,
                reveal.threshold,
                reveal.animation.clone(),
            );
        }
        surface
    }
}

// ----------------------------------------------------------------------
// Replay
// ----------------------------------------------------------------------

/// Timeline and layer state at one step of the simulated clock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSample {
    pub time_ms: f64,
    /// Whether a frame callback ran at this step
    pub ticked: bool,
    pub raw: f64,
    pub target: f64,
    pub current: f64,
    pub at_start: bool,
    pub at_end: bool,
    pub settling: bool,
    pub effects: BTreeMap<String, AppliedEffect>,
}

/// Everything a replay produced
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub fps: u32,
    pub samples: Vec<FrameSample>,
    pub reveals: Vec<(String, String)>,
    pub boundaries: Vec<(Edge, bool)>,
    pub restored: Vec<String>,
    pub frames_run: u64,
}

impl SimulationReport {
    pub fn last(&self) -> Option<&FrameSample> {
        self.samples.last()
    }

    /// Samples where a frame actually ran
    pub fn ticks(&self) -> impl Iterator<Item = &FrameSample> {
        self.samples.iter().filter(|s| s.ticked)
    }
}

/// Replay `script` at `fps` frames per second
pub fn run_script(script: &Script, config: &AppConfig, fps: u32) -> Result<SimulationReport> {
    if fps == 0 {
        return Err(Error::Script("fps must be at least 1".to_string()));
    }
    script.validate()?;

    let mut controller = TimelineController::new(
        script.surface(),
        RecordingSink::default(),
        &config.timeline,
        &config.layers,
    );

    let mut events: Vec<&ScriptEvent> = script.events.iter().collect();
    events.sort_by_key(|e| e.at_ms);
    let mut events = events.into_iter().peekable();

    let frame = Duration::from_secs_f64(1.0 / f64::from(fps));
    let total = script.duration();
    let epoch = Instant::now();
    let mut elapsed = Duration::ZERO;
    let mut raw = 0.0_f64;
    let mut samples = Vec::new();
    let mut frames_run = 0_u64;

    info!(
        "Simulating {} event(s) over {:?} at {} fps",
        script.events.len(),
        total,
        fps
    );

    loop {
        let now = epoch + elapsed;
        let elapsed_ms = elapsed.as_millis();

        while let Some(event) = events.next_if(|e| u128::from(e.at_ms) <= elapsed_ms) {
            apply_action(&mut controller, &event.action, &mut raw, now);
        }

        let mut ticked = false;
        if let Some(handle) = controller.host_mut().take_frame() {
            if controller.on_frame(handle, now).is_some() {
                ticked = true;
                frames_run += 1;
            }
        }

        let state = controller.state();
        samples.push(FrameSample {
            time_ms: elapsed.as_secs_f64() * 1000.0,
            ticked,
            raw: state.raw_input(),
            target: state.target_position(),
            current: state.current_position(),
            at_start: state.is_at_start(),
            at_end: state.is_at_end(),
            settling: state.is_settling(),
            effects: controller.sink().effects.clone(),
        });

        if elapsed >= total {
            break;
        }
        elapsed += frame;
    }

    let sink = controller.sink();
    Ok(SimulationReport {
        fps,
        samples,
        reveals: sink.reveals.clone(),
        boundaries: sink.boundaries.clone(),
        restored: sink.restored.clone(),
        frames_run,
    })
}

fn apply_action(
    controller: &mut TimelineController<SimulatedSurface, RecordingSink>,
    action: &Action,
    raw: &mut f64,
    now: Instant,
) {
    debug!("Script action: {:?}", action);
    match action {
        Action::Scroll { position } => {
            *raw = *position;
            controller.on_scroll(*raw, now);
        }
        Action::Wheel { delta } => {
            if controller.on_wheel(*delta).is_blocked() {
                return;
            }
            let max = controller.host().metrics().max_extent();
            *raw = (*raw + delta).clamp(0.0, max);
            controller.on_scroll(*raw, now);
        }
        Action::Resize {
            content_extent,
            viewport_extent,
            viewport_width,
        } => {
            let current = controller.host().metrics();
            controller.host_mut().set_metrics(Metrics::new(
                content_extent.unwrap_or(current.content_extent),
                viewport_extent.unwrap_or(current.viewport_extent),
                viewport_width.unwrap_or(current.viewport_width),
            ));
            controller.on_resize();
        }
        Action::ScrollTo {
            target,
            duration_ms,
        } => {
            controller.scroll_to_position(*target, duration_ms.map(Duration::from_millis));
        }
        Action::Pause => controller.pause(),
        Action::Resume => controller.resume(),
        Action::RemoveLayer { name } => {
            controller.host_mut().remove(name);
            controller.on_content_changed();
        }
        Action::Destroy => controller.destroy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
content_extent = 3000
viewport_extent = 800

[[layers]]
name = "sky"
category = "background"
speed = 0.2

[[layers]]
name = "headline"
category = "text"

[[reveals]]
name = "lineup"
offset = 1200
animation = "slide-up"

[[events]]
at_ms = 0
action = "scroll"
position = 900

[[events]]
at_ms = 1500
action = "resize"
viewport_extent = 1000
"#;

    #[test]
    fn test_parse_toml_script() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.layers.len(), 2);
        assert_eq!(script.viewport_width, 1280.0);
        assert_eq!(script.events[0].action, Action::Scroll { position: 900.0 });
        assert_eq!(script.duration(), Duration::from_millis(3_500));
    }

    #[test]
    fn test_parse_json_script() {
        let json = r#"{
            "content_extent": 2000,
            "viewport_extent": 600,
            "events": [{ "at_ms": 10, "action": "scroll_to", "target": 400 }]
        }"#;
        let script = Script::from_json_str(json).unwrap();
        assert_eq!(
            script.events[0].action,
            Action::ScrollTo { target: 400.0, duration_ms: None }
        );
    }

    #[test]
    fn test_duration_saturates_for_late_events() {
        let json = format!(
            r#"{{"content_extent": 2000, "viewport_extent": 500,
                "events": [{{"at_ms": {}, "action": "pause"}}]}}"#,
            u64::MAX - 1
        );
        let script = Script::from_json_str(&json).unwrap();
        assert_eq!(script.duration(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_rejects_negative_extent() {
        let err = Script::from_toml_str("content_extent = -5\nviewport_extent = 10").unwrap_err();
        assert!(matches!(err, Error::Script(_)));
    }

    #[test]
    fn test_replay_settles_and_reveals() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        let report = run_script(&script, &AppConfig::default(), 60).unwrap();

        let last = report.last().unwrap();
        assert!((last.current - 900.0).abs() <= 0.05);
        assert!(!last.settling);
        assert_eq!(report.reveals, vec![("lineup".to_string(), "slide-up".to_string())]);

        match last.effects.get("sky") {
            Some(AppliedEffect::Translation { y, .. }) => assert!((y + 90.0).abs() < 0.01),
            other => panic!("unexpected sky effect {:?}", other),
        }
    }

    #[test]
    fn test_wheel_at_start_is_blocked() {
        let script = Script::from_toml_str(
            r#"
content_extent = 3000
viewport_extent = 800

[[events]]
at_ms = 0
action = "wheel"
delta = -120
"#,
        )
        .unwrap();
        let report = run_script(&script, &AppConfig::default(), 60).unwrap();
        assert!(report.samples.iter().all(|s| s.raw == 0.0));
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        assert!(run_script(&script, &AppConfig::default(), 0).is_err());
    }
}
