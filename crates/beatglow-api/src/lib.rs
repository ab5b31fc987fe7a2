//! Shared types for beatglow visual plugins.
//!
//! Everything a plugin needs to draw one frame lives here: the audio metrics
//! snapshot, palettes and hue state, the accumulated rotation, the
//! perspective projection helpers and the [`FrameContext`] that bundles them.

pub mod audio;
pub mod color;
pub mod plugin;
pub mod projection;

pub use audio::{AudioMetrics, DEFAULT_SPECTRUM_LEN};
pub use color::{ColorState, HslColor, Palette, PALETTES};
pub use plugin::{FrameContext, Visualization};
pub use projection::{project, rotate, Projected, RotationState, DEFAULT_FOV};
