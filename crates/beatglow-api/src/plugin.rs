//! Frame context and the plugin trait.

use nannou::prelude::{vec2, Draw, Vec2, Vec3};

use crate::audio::AudioMetrics;
use crate::color::{HslColor, Palette};
use crate::projection::{self, Projected, RotationState, DEFAULT_FOV};

/// Everything a plugin may read while drawing one frame.
///
/// Borrowed for the duration of a single `draw` call; plugins never keep it.
pub struct FrameContext<'a> {
    /// Drawing surface, in nannou's centered coordinate space
    pub draw: &'a Draw,
    /// Surface width in points
    pub width: f32,
    /// Surface height in points
    pub height: f32,
    /// Byte spectrum, one sample per frequency bin
    pub spectrum: &'a [u8],
    pub metrics: AudioMetrics,
    pub palette: &'a Palette,
    /// Hue offset in degrees
    pub color_offset: f32,
    pub rotation: RotationState,
    /// Milliseconds since the app started
    pub time: f64,
}

impl<'a> FrameContext<'a> {
    pub fn buffer_len(&self) -> usize {
        self.spectrum.len()
    }

    /// Spectrum sample at `index` as 0-255, or 0 when out of range.
    pub fn sample(&self, index: usize) -> f32 {
        self.spectrum.get(index).copied().unwrap_or(0) as f32
    }

    /// Center of the surface in screen space.
    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }

    pub fn seconds(&self) -> f32 {
        (self.time / 1000.0) as f32
    }

    /// Spectrum-driven color shifted by the current hue drift.
    pub fn color(&self, value: f32, offset: f32) -> HslColor {
        HslColor::from_spectrum(value, self.color_offset, offset)
    }

    /// Apply the shared scene rotation.
    pub fn rotate(&self, point: Vec3) -> Vec3 {
        projection::rotate(
            point.x,
            point.y,
            point.z,
            self.rotation.x,
            self.rotation.y,
        )
    }

    /// Project an already rotated point with the default fov.
    pub fn project_rotated(&self, rotated: Vec3) -> Projected {
        projection::project(rotated, self.center(), DEFAULT_FOV, self.width, self.height)
    }

    /// Rotate by the shared scene rotation and project with the default fov.
    pub fn project(&self, point: Vec3) -> Projected {
        self.project_rotated(self.rotate(point))
    }

    /// Convert a top-left, y-down screen point into nannou world space.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        vec2(screen.x - self.width / 2.0, self.height / 2.0 - screen.y)
    }
}

/// A visual-pattern plugin.
///
/// Plugins own their per-pattern state (particle pools, star fields) and are
/// drawn once per displayed frame.
pub trait Visualization {
    fn name(&self) -> &'static str;

    fn draw(&mut self, ctx: &FrameContext);

    /// Discard accumulated state so the next frame starts fresh.
    fn reset(&mut self) {}
}
