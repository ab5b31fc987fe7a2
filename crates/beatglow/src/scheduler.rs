//! Frame pacing on top of the host's vsync-aligned update callback.
//!
//! The host calls [`FrameScheduler::on_vsync`] for every refresh; the
//! scheduler decides which of those candidates become rendered frames.

/// Candidates arriving this fraction of an interval early are still accepted
const FRAME_TOLERANCE: f64 = 0.8;

pub const DEFAULT_TARGET_FPS: f64 = 60.0;

/// An accepted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Milliseconds since the host started
    pub time: f64,
    /// Milliseconds since the previous accepted frame
    pub delta: f64,
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frame_interval: f64,
    running: bool,
    /// Timestamp of the last accepted frame, or of `start`
    last_time: f64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

impl FrameScheduler {
    pub fn new(target_fps: f64) -> Self {
        Self {
            frame_interval: 1000.0 / target_fps,
            running: false,
            last_time: 0.0,
        }
    }

    pub fn frame_interval(&self) -> f64 {
        self.frame_interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin accepting frames. Measures the first frame from `now_ms`.
    pub fn start(&mut self, now_ms: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time = now_ms;
    }

    /// Stop accepting frames; pending candidates are dropped.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Offer a vsync candidate. Returns the tick when it is accepted.
    pub fn on_vsync(&mut self, now_ms: f64) -> Option<FrameTick> {
        if !self.running {
            return None;
        }

        let delta = now_ms - self.last_time;
        if delta < self.frame_interval * FRAME_TOLERANCE {
            return None;
        }

        self.last_time = now_ms;
        Some(FrameTick { time: now_ms, delta })
    }
}

/// What the window has to do on a redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewWork {
    /// Leave the last composite on screen
    Skip,
    /// Composite the surface as it is, then the overlay
    Composite,
    /// Render the queued draw into the surface first
    RenderAndComposite,
}

impl ViewWork {
    /// `fresh_frame` is set when an accepted tick queued new draw commands.
    /// Paused playback still composites while the overlay changes.
    pub fn decide(fresh_frame: bool, overlay_visible: bool) -> Self {
        match (fresh_frame, overlay_visible) {
            (true, _) => ViewWork::RenderAndComposite,
            (false, true) => ViewWork::Composite,
            (false, false) => ViewWork::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Notification;

    #[test]
    fn test_stopped_scheduler_accepts_nothing() {
        let mut scheduler = FrameScheduler::default();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.on_vsync(1000.0), None);
    }

    #[test]
    fn test_tolerance_window() {
        let mut scheduler = FrameScheduler::new(60.0);
        scheduler.start(0.0);
        let interval = scheduler.frame_interval();

        assert_eq!(scheduler.on_vsync(interval * 0.5), None);
        let tick = scheduler.on_vsync(interval * 0.8).unwrap();
        assert!((tick.delta - interval * 0.8).abs() < 1e-9);
        assert_eq!(tick.time, interval * 0.8);
    }

    #[test]
    fn test_120hz_display_halved() {
        let mut scheduler = FrameScheduler::new(60.0);
        scheduler.start(0.0);
        let vsync = 1000.0 / 120.0;
        let accepted = (1..=120)
            .filter(|i| scheduler.on_vsync(*i as f64 * vsync).is_some())
            .count();
        assert_eq!(accepted, 60);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut scheduler = FrameScheduler::new(60.0);
        scheduler.start(0.0);
        scheduler.start(500.0);
        let tick = scheduler.on_vsync(20.0).unwrap();
        assert_eq!(tick.delta, 20.0);
    }

    #[test]
    fn test_restart_resets_baseline() {
        let mut scheduler = FrameScheduler::new(60.0);
        scheduler.start(0.0);
        assert!(scheduler.on_vsync(20.0).is_some());
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.on_vsync(5000.0), None);

        scheduler.start(10_000.0);
        assert_eq!(scheduler.on_vsync(10_005.0), None);
        let tick = scheduler.on_vsync(10_020.0).unwrap();
        assert_eq!(tick.delta, 20.0);
    }

    #[test]
    fn test_view_work() {
        assert_eq!(ViewWork::decide(true, false), ViewWork::RenderAndComposite);
        assert_eq!(ViewWork::decide(true, true), ViewWork::RenderAndComposite);
        assert_eq!(ViewWork::decide(false, true), ViewWork::Composite);
        assert_eq!(ViewWork::decide(false, false), ViewWork::Skip);
    }

    #[test]
    fn test_paused_overlay_is_still_composited() {
        let mut scheduler = FrameScheduler::default();
        let mut notification = Notification::default();
        scheduler.start(0.0);
        assert!(scheduler.on_vsync(20.0).is_some());

        scheduler.stop();
        notification.show("Paused");
        notification.tick();
        assert_eq!(scheduler.on_vsync(40.0), None);
        assert_eq!(
            ViewWork::decide(false, notification.needs_redraw()),
            ViewWork::Composite
        );

        while notification.needs_redraw() {
            assert_eq!(
                ViewWork::decide(false, notification.needs_redraw()),
                ViewWork::Composite
            );
            notification.tick();
        }
        assert_eq!(
            ViewWork::decide(false, notification.needs_redraw()),
            ViewWork::Skip
        );
    }
}
