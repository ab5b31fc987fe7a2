//! Spectrum to metrics: band partition, smoothing, throttling, beats.
//!
//! Pure and clock-free; callers pass the current time so beat cooldowns can be
//! driven deterministically.

use beatglow_api::AudioMetrics;
use std::ops::Range;

use super::beat::BeatDetector;

/// Smoothing coefficient while a band is rising
pub const SMOOTH_UP: f32 = 0.15;
/// Smoothing coefficient while a band is falling
pub const SMOOTH_DOWN: f32 = 0.08;

/// Fraction of bins that count as bass
const BASS_FRACTION: f32 = 0.1;
/// Fraction of bins below the end of the mid band
const MID_FRACTION: f32 = 0.5;

/// Bin ranges for bass, mid and high.
///
/// Contiguous, non-overlapping, covering `0..len`. Small buffers may yield
/// empty ranges.
pub fn band_ranges(len: usize) -> [Range<usize>; 3] {
    let bass_end = (len as f32 * BASS_FRACTION).floor() as usize;
    let mid_end = ((len as f32 * MID_FRACTION).floor() as usize).max(bass_end);
    [0..bass_end, bass_end..mid_end, mid_end..len]
}

/// Mean of `bins` normalised to 0-1; an empty slice is silent.
fn normalized_mean(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    sum as f32 / bins.len() as f32 / 255.0
}

/// One step of asymmetric exponential smoothing.
pub fn smooth(previous: f32, raw: f32) -> f32 {
    let coefficient = if raw > previous { SMOOTH_UP } else { SMOOTH_DOWN };
    previous + (raw - previous) * coefficient
}

#[derive(Debug, Clone, Default)]
pub struct MetricsAnalyzer {
    metrics: AudioMetrics,
    beat: BeatDetector,
    // Frame skipping
    frame_count: u64,
    last_calc_frame: u64,
}

impl MetricsAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot without advancing anything.
    pub fn metrics(&self) -> &AudioMetrics {
        &self.metrics
    }

    /// Advance one scheduler tick.
    ///
    /// Recomputes at most every second call; in between the previous snapshot
    /// is returned unchanged, `is_beat` included.
    pub fn update(&mut self, spectrum: &[u8], now_ms: f64) -> &AudioMetrics {
        self.frame_count += 1;
        if self.frame_count - self.last_calc_frame <= 1 {
            return &self.metrics;
        }
        self.last_calc_frame = self.frame_count;

        let [bass_bins, mid_bins, high_bins] = band_ranges(spectrum.len());
        let raw_bass = normalized_mean(&spectrum[bass_bins]);
        let raw_mid = normalized_mean(&spectrum[mid_bins]);
        let raw_high = normalized_mean(&spectrum[high_bins]);

        let bass = smooth(self.metrics.bass, raw_bass);
        let mid = smooth(self.metrics.mid, raw_mid);
        let high = smooth(self.metrics.high, raw_high);

        let reading = self.beat.process(raw_bass, bass, now_ms);

        self.metrics = AudioMetrics {
            bass,
            mid,
            high,
            average: normalized_mean(spectrum),
            beat_intensity: reading.intensity,
            is_beat: reading.is_beat,
        };
        &self.metrics
    }

    /// Back to silence: zero metrics, empty baseline, no cooldown.
    pub fn reset(&mut self) {
        self.metrics = AudioMetrics::default();
        self.beat.reset();
    }
}
