//! The timeline controller
//!
//! Owns the timeline state, the subscriber registry and the frame scheduler
//! for one scroll surface. The host feeds it input and frame callbacks; the
//! controller writes effects to its sink. Input handlers only touch the raw
//! and target positions and the bounds, while frames alone move the current
//! position and apply subscribers.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{EasingType, LayerConfig, TimelineConfig};
use crate::input::{wheel_disposition, InputDisposition, TouchTracker};
use crate::registry::{Axis, LayerCategory, RevealSet, SubscriberRegistry, SubscriptionId};
use crate::scheduler::{FrameScheduler, FrameStats, SettleTimer};
use crate::surface::{Edge, FrameHandle, HostSurface, Metrics, VisualEffectSink};
use crate::timeline::timing::{lerp, progress};
use crate::timeline::{tick, EasingParams, TickOutcome, TimelineState};

/// Programmatic scroll, driven by its own curve instead of the integrator
#[derive(Debug, Clone, Copy)]
enum ScrollTo {
    /// Requested, starts on the next frame
    Pending { to: f64, duration: Duration },
    Active {
        start: Instant,
        from: f64,
        to: f64,
        duration: Duration,
        easing: EasingType,
    },
}

/// Scroll-driven parallax controller for a single host surface.
///
/// Holds `Rc`/`Weak` element references, so it is neither `Send` nor `Sync`.
pub struct TimelineController<H, K>
where
    H: HostSurface,
    K: VisualEffectSink<H::Element>,
{
    host: H,
    sink: K,
    config: TimelineConfig,
    layers: LayerConfig,
    params: EasingParams,
    state: TimelineState,
    metrics: Metrics,
    registry: SubscriberRegistry<H::Element>,
    reveals: RevealSet<H::Element>,
    scheduler: FrameScheduler,
    settle: SettleTimer,
    stats: FrameStats,
    scroll_to: Option<ScrollTo>,
    touch: TouchTracker,
    last_frame: Option<Instant>,
    notified_start: bool,
    notified_end: bool,
    paused: bool,
    destroyed: bool,
}

impl<H, K> TimelineController<H, K>
where
    H: HostSurface,
    K: VisualEffectSink<H::Element>,
{
    /// Attach to `host`, scan its layers and schedule the first frame.
    pub fn new(host: H, sink: K, config: &TimelineConfig, layers: &LayerConfig) -> Self {
        let config = config.sanitized();
        let layers = layers.sanitized();
        let metrics = host.metrics();
        let state = TimelineState::new(metrics.max_extent());

        let mut controller = Self {
            host,
            sink,
            params: EasingParams::from_config(&config),
            settle: SettleTimer::new(config.settle_window()),
            stats: FrameStats::new(config.low_fps_warning),
            config,
            layers,
            notified_start: state.is_at_start(),
            notified_end: state.is_at_end(),
            state,
            metrics,
            registry: SubscriberRegistry::new(),
            reveals: RevealSet::new(),
            scheduler: FrameScheduler::new(),
            scroll_to: None,
            touch: TouchTracker::default(),
            last_frame: None,
            paused: false,
            destroyed: false,
        };
        controller.rescan();
        info!(
            "Timeline attached: max extent {:.1}, {} subscriber(s)",
            controller.state.max_extent(),
            controller.registry.len()
        );
        controller.wake();
        controller
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Host scroll offset changed
    pub fn on_scroll(&mut self, raw: f64, now: Instant) {
        if self.destroyed || self.paused {
            return;
        }
        self.scroll_to = None;
        self.state
            .apply_input(raw, self.config.boundary_zone, self.config.edge_epsilon);
        self.state.set_settling(true);
        self.settle.restart(now);
        self.wake();
    }

    /// Ask whether a wheel gesture may scroll natively
    pub fn on_wheel(&mut self, delta_y: f64) -> InputDisposition {
        if self.destroyed {
            return InputDisposition::Pass;
        }
        wheel_disposition(&self.state, delta_y)
    }

    pub fn on_touch_start(&mut self, y: f64) {
        if self.destroyed {
            return;
        }
        self.touch.start(y);
    }

    /// Ask whether a touch drag may scroll natively
    pub fn on_touch_move(&mut self, y: f64) -> InputDisposition {
        if self.destroyed {
            return InputDisposition::Pass;
        }
        self.touch.on_move(&self.state, y)
    }

    pub fn on_touch_end(&mut self) {
        self.touch.end();
    }

    /// Viewport size changed
    pub fn on_resize(&mut self) {
        if self.destroyed {
            return;
        }
        debug!("Resize: recalculating bounds");
        self.recalculate();
    }

    /// Host content was added, removed or re-laid out
    pub fn on_content_changed(&mut self) {
        if self.destroyed {
            return;
        }
        debug!("Content changed: rescanning layers");
        self.recalculate();
    }

    /// Jump target and current to `raw` without animation
    pub fn sync_to_position(&mut self, raw: f64) {
        if self.destroyed {
            return;
        }
        self.scroll_to = None;
        self.state
            .sync(raw, self.config.boundary_zone, self.config.edge_epsilon);
        self.wake();
    }

    /// Animate the target to `target` over `duration` (config default when
    /// `None`), starting on the next frame. Any user scroll cancels it.
    pub fn scroll_to_position(&mut self, target: f64, duration: Option<Duration>) {
        if self.destroyed {
            return;
        }
        let duration = duration.unwrap_or_else(|| self.config.scroll_to_duration());
        self.scroll_to = Some(ScrollTo::Pending {
            to: target,
            duration,
        });
        self.wake();
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Run one frame. Returns `None` when the frame was not ours to run
    /// (stale handle, paused or destroyed).
    pub fn on_frame(&mut self, handle: FrameHandle, now: Instant) -> Option<TickOutcome> {
        if self.destroyed || !self.scheduler.claim(handle) || self.paused {
            return None;
        }

        let dt = match self.last_frame {
            Some(last) => now.saturating_duration_since(last),
            None => self.params.reference_frame,
        };
        self.last_frame = Some(now);

        if self.settle.expire(now) {
            self.state.set_settling(false);
        }

        self.advance_scroll_to(now);

        let params = self.params.with_rate(self.base_rate());
        let mut outcome = tick(&mut self.state, dt, &params);

        let current = self.state.current_position();
        let viewport = self.metrics.viewport_extent;
        self.registry
            .apply_all(current, viewport, &self.layers, &mut self.sink);
        self.reveals
            .evaluate(current, viewport, self.layers.reveal_threshold, &mut self.sink);

        self.stats.record(now);
        self.notify_boundaries();

        if self.scroll_to.is_some() || self.settle.is_armed() {
            outcome = TickOutcome::Continue;
        }
        match outcome {
            TickOutcome::Continue => {
                self.scheduler.request(&mut self.host);
            }
            TickOutcome::Idle => {
                self.last_frame = None;
                self.stats.pause();
            }
        }
        Some(outcome)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register an element explicitly. Registering the same element again
    /// replaces its entry and returns the same handle. `None` once destroyed.
    pub fn register(
        &mut self,
        element: &Rc<H::Element>,
        speed: f64,
        axis: Axis,
        category: LayerCategory,
    ) -> Option<SubscriptionId> {
        if self.destroyed {
            return None;
        }
        let id = self.registry.register(element, speed, axis, category);
        self.wake();
        Some(id)
    }

    pub fn register_range<'a, I>(&mut self, items: I) -> Vec<SubscriptionId>
    where
        H::Element: 'a,
        I: IntoIterator<Item = (&'a Rc<H::Element>, f64, Axis, LayerCategory)>,
    {
        if self.destroyed {
            return Vec::new();
        }
        let ids = self.registry.register_range(items);
        self.wake();
        ids
    }

    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        if self.destroyed {
            return false;
        }
        self.registry.unregister(id)
    }

    pub fn unregister_all(&mut self) {
        if self.destroyed {
            return;
        }
        self.registry.unregister_all();
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Freeze the timeline: scroll input is ignored until `resume`
    pub fn pause(&mut self) {
        if self.destroyed || self.paused {
            return;
        }
        self.paused = true;
        self.scheduler.cancel(&mut self.host);
        self.last_frame = None;
        self.stats.pause();
        debug!("Timeline paused");
    }

    pub fn resume(&mut self) {
        if self.destroyed || !self.paused {
            return;
        }
        self.paused = false;
        debug!("Timeline resumed");
        self.wake();
    }

    /// Tear down. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.cancel(&mut self.host);
        self.settle.cancel();
        self.state.set_settling(false);
        self.scroll_to = None;
        self.touch.end();
        self.host.detach_listeners();
        if self.config.restore_on_destroy {
            self.registry.restore_all(&mut self.sink);
        }
        self.destroyed = true;
        info!("Timeline destroyed after {} frame(s)", self.stats.total_frames());
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn current_position(&self) -> f64 {
        self.state.current_position()
    }

    #[inline]
    pub fn target_position(&self) -> f64 {
        self.state.target_position()
    }

    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.state.max_extent()
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn layers(&self) -> &LayerConfig {
        &self.layers
    }

    pub fn registry(&self) -> &SubscriberRegistry<H::Element> {
        &self.registry
    }

    pub fn reveals(&self) -> &RevealSet<H::Element> {
        &self.reveals
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn is_frame_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn is_scrolling_to(&self) -> bool {
        self.scroll_to.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn wake(&mut self) {
        if !self.paused && !self.destroyed {
            self.scheduler.request(&mut self.host);
        }
    }

    fn base_rate(&self) -> f64 {
        let width = self.metrics.viewport_width;
        if width > 0.0 && width < self.config.compact_breakpoint {
            self.config.compact_easing_rate
        } else {
            self.config.easing_rate
        }
    }

    fn rescan(&mut self) {
        let scan = self.host.scan();
        self.registry.rebuild_from_scan(scan.layers, &self.layers);
        self.reveals.rebuild(scan.reveals);
    }

    fn recalculate(&mut self) {
        self.metrics = self.host.metrics();
        self.state
            .set_max_extent(self.metrics.max_extent(), self.config.edge_epsilon);
        self.rescan();
        self.wake();
    }

    fn advance_scroll_to(&mut self, now: Instant) {
        let Some(scroll_to) = self.scroll_to else {
            return;
        };
        let edge_epsilon = self.config.edge_epsilon;

        match scroll_to {
            ScrollTo::Pending { to, duration } if duration.is_zero() => {
                self.state.set_target(to, edge_epsilon);
                self.scroll_to = None;
            }
            ScrollTo::Pending { to, duration } => {
                self.scroll_to = Some(ScrollTo::Active {
                    start: now,
                    from: self.state.target_position(),
                    to,
                    duration,
                    easing: self.config.scroll_to_easing,
                });
            }
            ScrollTo::Active {
                start,
                from,
                to,
                duration,
                easing,
            } => {
                let t = progress(now.saturating_duration_since(start), duration);
                self.state.set_target(lerp(from, to, easing.apply(t)), edge_epsilon);
                if t >= 1.0 {
                    self.scroll_to = None;
                }
            }
        }
    }

    fn notify_boundaries(&mut self) {
        let at_start = self.state.is_at_start();
        if at_start != self.notified_start {
            self.notified_start = at_start;
            self.sink.boundary_changed(Edge::Start, at_start);
        }
        let at_end = self.state.is_at_end();
        if at_end != self.notified_end {
            self.notified_end = at_end;
            self.sink.boundary_changed(Edge::End, at_end);
        }
    }
}
