//! Byte frequency spectrum from captured samples.
//!
//! Windowed FFT, per-bin temporal smoothing, then a linear map of the
//! decibel range `MIN_DB..MAX_DB` onto 0-255.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
const SMOOTHING: f32 = 0.8;

pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,
    /// Smoothed linear magnitudes, one per output bin
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Blackman window
        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / n;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            fft,
            fft_size,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            window,
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    /// Number of output bins.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|s| *s = 0.0);
    }

    /// Analyse the most recent `fft_size` samples into `out`.
    ///
    /// Short input is zero-padded at the front; `out` receives at most
    /// `bin_count()` values.
    pub fn process(&mut self, samples: &[f32], out: &mut [u8]) {
        let take = samples.len().min(self.fft_size);
        let pad = self.fft_size - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let scale = 1.0 / self.fft_size as f32;
        let db_range = MAX_DB - MIN_DB;

        for (k, (smoothed, byte)) in self.smoothed.iter_mut().zip(out.iter_mut()).enumerate() {
            let magnitude = self.fft_buffer[k].norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;

            *byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (255.0 * (db - MIN_DB) / db_range).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }
}
