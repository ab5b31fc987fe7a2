//! Session state that lives between frames.

use beatglow_api::{ColorState, RotationState};

use crate::renderer::VisualizationMode;

#[derive(Debug, Clone)]
pub struct VisualState {
    pub mode: VisualizationMode,
    pub color: ColorState,
    pub rotation: RotationState,
    pub playing: bool,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            mode: VisualizationMode::TrapNation,
            color: ColorState::default(),
            rotation: RotationState::default(),
            playing: true,
        }
    }
}

impl VisualState {
    pub fn with_mode(mode: VisualizationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Per-frame drift of the shared rotation and hue.
    pub fn advance(&mut self, time_ms: f64) {
        self.rotation.advance(time_ms);
        self.color.advance();
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = VisualState::default();
        assert!(state.playing);
        assert_eq!(state.mode, VisualizationMode::TrapNation);
        assert_eq!(state.color.palette_index(), 0);
    }

    #[test]
    fn test_advance_moves_rotation_and_hue() {
        let mut state = VisualState::default();
        state.advance(1000.0);
        assert!(state.rotation.y > 0.0);
        assert!(state.color.offset() > 0.0);
    }

    #[test]
    fn test_toggle_playing() {
        let mut state = VisualState::default();
        assert!(!state.toggle_playing());
        assert!(state.toggle_playing());
    }
}
