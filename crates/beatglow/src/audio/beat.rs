//! Adaptive-threshold beat detection on smoothed bass energy.

use std::collections::VecDeque;

/// Samples kept for the rolling bass baseline
pub const BEAT_HISTORY_SIZE: usize = 30;

/// Minimum spacing between declared beats
pub const BEAT_COOLDOWN_MS: f64 = 100.0;

/// Absolute floor the smoothed bass must clear
const MIN_BEAT_THRESHOLD: f32 = 0.4;
/// Multiple of the baseline that sets the adaptive threshold
const THRESHOLD_RATIO: f32 = 1.4;
/// Smoothed bass must also stand this far above the baseline
const MIN_RATIO_ABOVE_AVERAGE: f32 = 1.2;

/// Fixed-capacity FIFO of raw bass samples, zero-filled at start.
#[derive(Debug, Clone)]
pub struct BeatHistory {
    samples: VecDeque<f32>,
}

impl Default for BeatHistory {
    fn default() -> Self {
        Self {
            samples: std::iter::repeat(0.0).take(BEAT_HISTORY_SIZE).collect(),
        }
    }
}

impl BeatHistory {
    /// Evict the oldest sample and append `value`.
    pub fn push(&mut self, value: f32) {
        self.samples.pop_front();
        self.samples.push_back(value);
    }

    pub fn average(&self) -> f32 {
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }
}

/// Outcome of one detection step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatReading {
    pub is_beat: bool,
    pub intensity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct BeatDetector {
    history: BeatHistory,
    /// Time of the last declared beat; `None` until the first one
    last_beat_ms: Option<f64>,
}

impl BeatDetector {
    /// Feed one analysis tick.
    ///
    /// `raw_bass` joins the baseline before the threshold is computed, so a
    /// spike raises its own bar slightly.
    pub fn process(&mut self, raw_bass: f32, smoothed_bass: f32, now_ms: f64) -> BeatReading {
        self.history.push(raw_bass);
        let average = self.history.average();

        let threshold = MIN_BEAT_THRESHOLD.max(average * THRESHOLD_RATIO);
        let cooled_down = self
            .last_beat_ms
            .map_or(true, |last| now_ms - last > BEAT_COOLDOWN_MS);

        let is_beat = smoothed_bass > threshold
            && smoothed_bass > average * MIN_RATIO_ABOVE_AVERAGE
            && cooled_down;

        if is_beat {
            self.last_beat_ms = Some(now_ms);
        }

        let intensity = ((smoothed_bass - average) / 0.5 + smoothed_bass).clamp(0.0, 1.0);

        BeatReading { is_beat, intensity }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
