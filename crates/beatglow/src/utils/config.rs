//! Configuration file management.
//!
//! Reads tuning and defaults from `~/.beatglow.toml`. The file is read-only
//! input; session state is never written back.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::postprocess::{EffectToggles, EffectsConfig, EffectsTuning, MAX_BLOOM_RADIUS};
use crate::scheduler::DEFAULT_TARGET_FPS;

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_FFT_SIZE: usize = 512;

const CONFIG_TEMPLATE: &str = r#"# beatglow configuration file

# Frame pacing target (default: 60)
# target_fps = 60

# Seconds to wait for a capture device to report its config (default: 3)
# device_timeout_secs = 3

# Capture FFT size, power of two; the spectrum has fft_size / 2 bins (default: 512)
# fft_size = 512

# Log level when RUST_LOG is unset: error, warn, info, debug, trace (default: info)
# log_level = "info"

# Visualization shown at start-up (default: "trapnation")
# default_mode = "trapnation"

# =============================================================================
# Post-processing
# =============================================================================

# effects_enabled = true
# bloom = true
# chromatic = true
# vignette = true
# grain = true
# color_grade = true
# audio_reactive = true

# bloom_threshold = 0.6        # Luminance above which pixels bloom
# bloom_intensity = 0.8        # Bloom mix strength
# bloom_radius = 4             # Blur iterations
# chromatic_strength = 0.003   # RGB split at the screen edge
# vignette_strength = 0.4
# grain_strength = 0.08
# saturation = 1.15
# contrast = 1.1
"#;

#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct Config {
    pub target_fps: Option<f64>,
    pub device_timeout_secs: Option<u64>,
    pub fft_size: Option<usize>,
    pub log_level: Option<String>,
    pub default_mode: Option<String>,

    // Effect toggles (flattened for simpler TOML)
    pub effects_enabled: Option<bool>,
    pub bloom: Option<bool>,
    pub chromatic: Option<bool>,
    pub vignette: Option<bool>,
    pub grain: Option<bool>,
    pub color_grade: Option<bool>,
    pub audio_reactive: Option<bool>,

    // Effect tuning
    pub bloom_threshold: Option<f32>,
    pub bloom_intensity: Option<f32>,
    pub bloom_radius: Option<u32>,
    pub chromatic_strength: Option<f32>,
    pub vignette_strength: Option<f32>,
    pub grain_strength: Option<f32>,
    pub saturation: Option<f32>,
    pub contrast: Option<f32>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".beatglow.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => info!("Created config template at {:?}", path),
                Err(e) => warn!("Could not write config template to {:?}: {}", path, e),
            }
        }

        match fs::read_to_string(&path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
            .filter(|fps| *fps > 0.0)
            .unwrap_or(DEFAULT_TARGET_FPS)
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(
            self.device_timeout_secs
                .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS),
        )
    }

    /// FFT size rounded up to a power of two, at least 32.
    pub fn fft_size(&self) -> usize {
        self.fft_size
            .unwrap_or(DEFAULT_FFT_SIZE)
            .clamp(32, 32768)
            .next_power_of_two()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn default_mode(&self) -> &str {
        self.default_mode.as_deref().unwrap_or("trapnation")
    }

    /// Get effects configuration with defaults
    pub fn effects(&self) -> EffectsConfig {
        let toggles = EffectToggles::default();
        let tuning = EffectsTuning::default();
        EffectsConfig {
            toggles: EffectToggles {
                enabled: self.effects_enabled.unwrap_or(toggles.enabled),
                bloom: self.bloom.unwrap_or(toggles.bloom),
                chromatic: self.chromatic.unwrap_or(toggles.chromatic),
                vignette: self.vignette.unwrap_or(toggles.vignette),
                grain: self.grain.unwrap_or(toggles.grain),
                color_grade: self.color_grade.unwrap_or(toggles.color_grade),
                audio_reactive: self.audio_reactive.unwrap_or(toggles.audio_reactive),
            },
            tuning: EffectsTuning {
                bloom_threshold: self.bloom_threshold.unwrap_or(tuning.bloom_threshold),
                bloom_intensity: self.bloom_intensity.unwrap_or(tuning.bloom_intensity),
                bloom_radius: self
                    .bloom_radius
                    .unwrap_or(tuning.bloom_radius)
                    .min(MAX_BLOOM_RADIUS),
                chromatic_strength: self.chromatic_strength.unwrap_or(tuning.chromatic_strength),
                vignette_strength: self.vignette_strength.unwrap_or(tuning.vignette_strength),
                grain_strength: self.grain_strength.unwrap_or(tuning.grain_strength),
                saturation: self.saturation.unwrap_or(tuning.saturation),
                contrast: self.contrast.unwrap_or(tuning.contrast),
            },
        }
    }
}
