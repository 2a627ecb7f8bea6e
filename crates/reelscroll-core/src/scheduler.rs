//! Frame scheduling, the settle debounce, and frame-rate monitoring

use std::time::{Duration, Instant};

use tracing::warn;

use crate::surface::{FrameHandle, HostSurface};

/// Keeps at most one frame callback pending with the host
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<FrameHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Ask the host for a frame unless one is already pending
    pub fn request<H: HostSurface + ?Sized>(&mut self, host: &mut H) -> FrameHandle {
        if let Some(handle) = self.pending {
            return handle;
        }
        let handle = host.request_frame();
        self.pending = Some(handle);
        handle
    }

    /// Accept a fired frame. Returns false for stale or foreign handles.
    pub fn claim(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<H: HostSurface + ?Sized>(&mut self, host: &mut H) {
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
    }
}

/// Last-write-wins debounce for the settling window.
///
/// Every restart replaces the previous deadline; nothing accumulates.
#[derive(Debug, Clone)]
pub struct SettleTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl SettleTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once, when the deadline has passed
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Frames-per-second counter over one-second windows
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    window_start: Option<Instant>,
    frames_in_window: u32,
    last_fps: Option<u32>,
    total_frames: u64,
    low_fps_warning: u32,
}

impl FrameStats {
    pub fn new(low_fps_warning: u32) -> Self {
        Self {
            low_fps_warning,
            ..Self::default()
        }
    }

    /// Count a frame rendered at `now`
    pub fn record(&mut self, now: Instant) {
        self.total_frames += 1;
        let start = *self.window_start.get_or_insert(now);
        self.frames_in_window += 1;

        if now.duration_since(start) >= Duration::from_secs(1) {
            let fps = self.frames_in_window;
            self.last_fps = Some(fps);
            self.frames_in_window = 0;
            self.window_start = Some(now);

            if self.low_fps_warning > 0 && fps < self.low_fps_warning {
                warn!("Low frame rate: {} fps (warning below {})", fps, self.low_fps_warning);
            }
        }
    }

    /// Forget the running window; called when the scheduler goes idle
    pub fn pause(&mut self) {
        self.window_start = None;
        self.frames_in_window = 0;
    }

    /// Frame rate measured over the last complete window
    pub fn fps(&self) -> Option<u32> {
        self.last_fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{LayerScan, Metrics};

    #[derive(Default)]
    struct CountingHost {
        next: u64,
        requested: u32,
        cancelled: Vec<FrameHandle>,
    }

    impl HostSurface for CountingHost {
        type Element = ();

        fn metrics(&self) -> Metrics {
            Metrics::default()
        }

        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            self.requested += 1;
            FrameHandle(self.next)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }

        fn scan(&self) -> LayerScan<()> {
            LayerScan::default()
        }
    }

    #[test]
    fn test_request_is_idempotent() {
        let mut host = CountingHost::default();
        let mut scheduler = FrameScheduler::new();

        let first = scheduler.request(&mut host);
        let second = scheduler.request(&mut host);
        assert_eq!(first, second);
        assert_eq!(host.requested, 1);
    }

    #[test]
    fn test_claim_rejects_stale_handles() {
        let mut host = CountingHost::default();
        let mut scheduler = FrameScheduler::new();

        let handle = scheduler.request(&mut host);
        assert!(!scheduler.claim(FrameHandle(handle.0 + 10)));
        assert!(scheduler.claim(handle));
        assert!(!scheduler.claim(handle));
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_cancel_tells_host() {
        let mut host = CountingHost::default();
        let mut scheduler = FrameScheduler::new();

        let handle = scheduler.request(&mut host);
        scheduler.cancel(&mut host);
        scheduler.cancel(&mut host);
        assert_eq!(host.cancelled, vec![handle]);
    }

    #[test]
    fn test_settle_timer_restart_replaces_deadline() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(100));

        timer.restart(start);
        timer.restart(start + Duration::from_millis(80));
        assert!(!timer.expire(start + Duration::from_millis(120)));
        assert!(timer.expire(start + Duration::from_millis(180)));
        assert!(!timer.expire(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_frame_stats_measures_fps() {
        let start = Instant::now();
        let mut stats = FrameStats::new(50);
        for i in 0..=30 {
            stats.record(start + Duration::from_millis(i * 34));
        }
        assert_eq!(stats.total_frames(), 31);
        assert_eq!(stats.fps(), Some(31));
    }
}
