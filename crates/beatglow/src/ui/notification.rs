//! Transient status text shown at the top of the window.

use nannou::prelude::*;

/// ~3 seconds at 60fps
const NOTIFICATION_FRAMES: u32 = 180;

#[derive(Debug, Default)]
pub struct Notification {
    text: Option<String>,
    frames_left: u32,
    /// Set for the tick on which the text expired
    cleared: bool,
}

impl Notification {
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.frames_left = NOTIFICATION_FRAMES;
        self.cleared = false;
    }

    /// Count down one displayed frame.
    pub fn tick(&mut self) {
        self.cleared = false;
        if self.frames_left > 0 {
            self.frames_left -= 1;
            if self.frames_left == 0 {
                self.text = None;
                self.cleared = true;
            }
        }
    }

    /// Whether the window must be repainted for the overlay: it is showing,
    /// or it just went away and its last frame is still on screen.
    pub fn needs_redraw(&self) -> bool {
        self.text.is_some() || self.cleared
    }

    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Fades over the last second
    fn alpha(&self) -> f32 {
        (self.frames_left as f32 / 60.0).min(1.0)
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect) {
        if let Some(ref text) = self.text {
            draw.text(text)
                .x_y(0.0, bounds.top() - 30.0)
                .w(bounds.w())
                .color(rgba(1.0, 1.0, 1.0, self.alpha()))
                .font_size(24);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_its_frames() {
        let mut n = Notification::default();
        n.show("Bloom: off");
        assert_eq!(n.text(), Some("Bloom: off"));
        for _ in 0..NOTIFICATION_FRAMES - 1 {
            n.tick();
        }
        assert!(n.text().is_some());
        n.tick();
        assert_eq!(n.text(), None);
    }

    #[test]
    fn test_needs_one_redraw_after_expiry() {
        let mut n = Notification::default();
        assert!(!n.needs_redraw());
        n.show("Paused");
        for _ in 0..NOTIFICATION_FRAMES - 1 {
            n.tick();
            assert!(n.needs_redraw());
        }
        n.tick();
        assert_eq!(n.text(), None);
        assert!(n.needs_redraw());
        n.tick();
        assert!(!n.needs_redraw());
    }

    #[test]
    fn test_fades_in_last_second() {
        let mut n = Notification::default();
        n.show("x");
        assert_eq!(n.alpha(), 1.0);
        for _ in 0..NOTIFICATION_FRAMES - 30 {
            n.tick();
        }
        assert!((n.alpha() - 0.5).abs() < 1e-6);
    }
}
