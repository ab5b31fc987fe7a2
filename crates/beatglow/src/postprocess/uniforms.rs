//! Uniform blocks, laid out to match the WGSL structs.

use super::effects::EffectsConfig;

/// Keeps `(b - t) / (1 - t)` finite in the threshold shader
const MAX_BLOOM_THRESHOLD: f32 = 0.999;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ThresholdUniforms {
    pub threshold: f32,
    pub _padding: [f32; 3],
}

impl ThresholdUniforms {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, MAX_BLOOM_THRESHOLD),
            _padding: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    /// (1, 0) horizontal or (0, 1) vertical
    pub direction: [f32; 2],
    /// Size of the texture being blurred, in texels
    pub resolution: [f32; 2],
}

impl BlurUniforms {
    pub fn horizontal(size: [u32; 2]) -> Self {
        Self {
            direction: [1.0, 0.0],
            resolution: [size[0] as f32, size[1] as f32],
        }
    }

    pub fn vertical(size: [u32; 2]) -> Self {
        Self {
            direction: [0.0, 1.0],
            resolution: [size[0] as f32, size[1] as f32],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CombineUniforms {
    pub bloom_intensity: f32,
    pub _padding: [f32; 3],
}

impl CombineUniforms {
    pub fn new(bloom_intensity: f32) -> Self {
        Self {
            bloom_intensity,
            _padding: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FinalUniforms {
    /// Seconds
    pub time: f32,
    pub bass_level: f32,
    pub resolution: [f32; 2],
    pub chromatic_strength: f32,
    pub vignette_strength: f32,
    pub grain_strength: f32,
    pub saturation: f32,
    pub contrast: f32,
    // Booleans as 0/1
    pub chromatic_enabled: u32,
    pub vignette_enabled: u32,
    pub grain_enabled: u32,
    pub color_grade_enabled: u32,
    pub audio_reactive: u32,
    pub _padding: [u32; 2],
}

impl FinalUniforms {
    pub fn new(effects: &EffectsConfig, time_ms: f64, bass: f32, size: [u32; 2]) -> Self {
        let toggles = &effects.toggles;
        let tuning = &effects.tuning;
        Self {
            time: (time_ms * 0.001) as f32,
            bass_level: bass,
            resolution: [size[0] as f32, size[1] as f32],
            chromatic_strength: tuning.chromatic_strength,
            vignette_strength: tuning.vignette_strength,
            grain_strength: tuning.grain_strength,
            saturation: tuning.saturation,
            contrast: tuning.contrast,
            chromatic_enabled: toggles.chromatic as u32,
            vignette_enabled: toggles.vignette as u32,
            grain_enabled: toggles.grain as u32,
            color_grade_enabled: toggles.color_grade as u32,
            audio_reactive: toggles.audio_reactive as u32,
            _padding: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<ThresholdUniforms>(), 16);
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 16);
        assert_eq!(std::mem::size_of::<CombineUniforms>(), 16);
        assert_eq!(std::mem::size_of::<FinalUniforms>(), 64);
    }

    #[test]
    fn test_threshold_kept_below_one() {
        assert_eq!(ThresholdUniforms::new(1.0).threshold, MAX_BLOOM_THRESHOLD);
        assert_eq!(ThresholdUniforms::new(0.6).threshold, 0.6);
    }

    #[test]
    fn test_final_uniforms_from_effects() {
        let mut effects = EffectsConfig::default();
        effects.toggles.grain = false;
        let u = FinalUniforms::new(&effects, 2500.0, 0.5, [1920, 1080]);
        assert_eq!(u.time, 2.5);
        assert_eq!(u.resolution, [1920.0, 1080.0]);
        assert_eq!(u.grain_enabled, 0);
        assert_eq!(u.chromatic_enabled, 1);
        assert_eq!(u.audio_reactive, 1);
        assert_eq!(u.saturation, 1.15);
    }
}
