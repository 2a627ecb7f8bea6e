use std::time::Instant;

use reelscroll_core::{AppConfig, HostSurface, TimelineController};
use tracing::debug;

use crate::input::Action;
use crate::scene::Scene;
use crate::surface::{CellSink, TerminalSurface};
use crate::theme::Theme;

pub type Timeline = TimelineController<TerminalSurface, CellSink>;

/// Rows reserved below the poster for the status bar
pub const STATUS_ROWS: u16 = 1;

/// Application state
pub struct App {
    /// Application configuration
    pub config: AppConfig,
    /// Scroll controller driving the poster
    pub timeline: Timeline,
    pub theme: Theme,
    /// Host scroll offset, clamped like a native scroll container
    raw_offset: f64,
    /// First key of a pending double press (e.g., 'g' of 'gg')
    pub pending_key: Option<char>,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: AppConfig, cols: u16, rows: u16) -> Self {
        let surface = TerminalSurface::new(
            Scene::festival(),
            cols,
            rows.saturating_sub(STATUS_ROWS),
            config.ui.units_per_row,
        );
        let mut timeline = TimelineController::new(
            surface,
            CellSink::default(),
            &config.timeline,
            &config.layers,
        );
        // Edge notifications only report changes, so seed the initial flags
        let (at_start, at_end) = (timeline.state().is_at_start(), timeline.state().is_at_end());
        let sink = timeline.sink_mut();
        sink.at_start = at_start;
        sink.at_end = at_end;
        Self {
            config,
            timeline,
            theme: Theme::default(),
            raw_offset: 0.0,
            pending_key: None,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn raw_offset(&self) -> f64 {
        self.raw_offset
    }

    /// Set a status message to display
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Whether the event loop should poll at the animation rate
    pub fn needs_animation(&self) -> bool {
        self.timeline.host().has_pending_frame()
    }

    /// Run the frame the controller asked for, if any
    pub fn run_frame(&mut self, now: Instant) -> bool {
        match self.timeline.host_mut().take_frame() {
            Some(handle) => self.timeline.on_frame(handle, now).is_some(),
            None => false,
        }
    }

    /// Scroll the host by `delta` units unless paused or the overscroll guard objects
    pub fn scroll_by(&mut self, delta: f64, now: Instant) -> bool {
        if self.timeline.is_paused() {
            self.set_status("Paused (p to resume)");
            return false;
        }
        if self.timeline.on_wheel(delta).is_blocked() {
            let edge = if delta < 0.0 { "top" } else { "bottom" };
            self.set_status(format!("Already at the {}", edge));
            return false;
        }
        let max = self.timeline.host().metrics().max_extent();
        self.raw_offset = (self.raw_offset + delta).clamp(0.0, max);
        self.timeline.on_scroll(self.raw_offset, now);
        true
    }

    /// Terminal resized to `cols` x `rows`
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.timeline
            .host_mut()
            .resize(cols, rows.saturating_sub(STATUS_ROWS));
        self.timeline.on_resize();
        let max = self.timeline.max_extent();
        self.raw_offset = self.raw_offset.min(max);
        debug!("Resized to {}x{}, max extent {:.1}", cols, rows, max);
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) {
        if let Action::Pending(key) = action {
            self.pending_key = Some(key);
            return;
        }
        self.pending_key = None;

        let step = self.config.ui.scroll_step;
        let half_page = self.timeline.metrics().viewport_extent / 2.0;

        match action {
            Action::Quit => {
                self.timeline.destroy();
                self.should_quit = true;
            }
            Action::ScrollDown => {
                self.scroll_by(step, now);
            }
            Action::ScrollUp => {
                self.scroll_by(-step, now);
            }
            Action::PageDown => {
                self.scroll_by(half_page.max(step), now);
            }
            Action::PageUp => {
                self.scroll_by(-half_page.max(step), now);
            }
            Action::JumpToTop => self.jump_to(0.0),
            Action::JumpToBottom => self.jump_to(self.timeline.max_extent()),
            Action::TogglePause => {
                if self.timeline.is_paused() {
                    self.timeline.resume();
                    self.set_status("Resumed");
                } else {
                    self.timeline.pause();
                    self.set_status("Paused");
                }
            }
            Action::Rescan => {
                self.timeline.on_content_changed();
                let count = self.timeline.registry().len();
                self.set_status(format!("Rescanned: {} layers", count));
            }
            Action::Pending(_) | Action::None => {}
        }
    }

    fn jump_to(&mut self, target: f64) {
        self.raw_offset = target;
        self.timeline.scroll_to_position(target, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app() -> App {
        App::new(AppConfig::default(), 80, 41)
    }

    fn settle(app: &mut App, mut now: Instant) -> Instant {
        let frame = Duration::from_micros(16_667);
        for _ in 0..5_000 {
            if !app.needs_animation() {
                return now;
            }
            now += frame;
            app.run_frame(now);
        }
        panic!("poster never came to rest");
    }

    #[test]
    fn test_scroll_moves_poster() {
        let mut app = app();
        let start = settle(&mut app, Instant::now());

        for _ in 0..20 {
            app.handle_action(Action::ScrollDown, start);
        }
        settle(&mut app, start);

        assert_eq!(app.raw_offset(), 480.0);
        assert!((app.timeline.current_position() - 480.0).abs() <= 0.05);
        let stars = app.timeline.host().scene().find("stars").unwrap().presentation();
        assert!(stars.dy < 0.0);
    }

    #[test]
    fn test_scroll_up_at_top_is_blocked() {
        let mut app = app();
        assert!(!app.scroll_by(-24.0, Instant::now()));
        assert_eq!(app.status_message.as_deref(), Some("Already at the top"));
        assert_eq!(app.raw_offset(), 0.0);
    }

    #[test]
    fn test_scroll_while_paused_keeps_offset() {
        let mut app = app();
        let now = settle(&mut app, Instant::now());
        app.handle_action(Action::TogglePause, now);

        assert!(!app.scroll_by(24.0, now));
        assert_eq!(app.raw_offset(), 0.0);
        assert_eq!(app.timeline.state().target_position(), 0.0);

        app.handle_action(Action::TogglePause, now);
        assert!(app.scroll_by(24.0, now));
        assert_eq!(app.raw_offset(), 24.0);
        let target = app.timeline.state().target_position();
        assert!(target > 0.0);
        settle(&mut app, now);
        assert!((app.timeline.current_position() - target).abs() <= 0.05);
    }

    #[test]
    fn test_gg_jumps_to_top() {
        let mut app = app();
        let now = Instant::now();
        app.handle_action(Action::JumpToBottom, now);
        let now = settle(&mut app, now);
        assert_eq!(app.timeline.current_position(), app.timeline.max_extent());

        app.handle_action(Action::Pending('g'), now);
        assert_eq!(app.pending_key, Some('g'));
        app.handle_action(Action::JumpToTop, now);
        assert_eq!(app.pending_key, None);
        settle(&mut app, now);
        assert_eq!(app.timeline.current_position(), 0.0);
    }

    #[test]
    fn test_resize_clamps_offset() {
        let mut app = app();
        let now = Instant::now();
        app.handle_action(Action::JumpToBottom, now);
        settle(&mut app, now);

        app.resize(80, 121);
        assert_eq!(app.timeline.max_extent(), 160.0);
        assert_eq!(app.raw_offset(), 160.0);
        assert_eq!(app.timeline.current_position(), 160.0);
    }

    #[test]
    fn test_quit_destroys_timeline() {
        let mut app = app();
        app.handle_action(Action::Quit, Instant::now());
        assert!(app.should_quit);
        assert!(app.timeline.is_destroyed());
        assert!(app.timeline.host().is_detached());
    }
}
