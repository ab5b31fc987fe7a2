//! The audio analysis engine: capture (or demo waveform) in, metrics out.

use beatglow_api::AudioMetrics;
use std::time::{Duration, Instant};
use tracing::debug;

use super::analyzer::MetricsAnalyzer;
use super::fft::SpectrumAnalyser;
use super::source_pipe::{DeviceInfo, SourcePipe};
use super::spectrum::SpectrumBuffer;
use crate::error::CaptureResult;

pub struct AudioEngine {
    source: SourcePipe,
    analyser: SpectrumAnalyser,
    spectrum: SpectrumBuffer,
    analyzer: MetricsAnalyzer,
    /// Scratch copy of the capture ring
    samples: Vec<f32>,
    started: Instant,
}

impl AudioEngine {
    pub fn new(fft_size: usize, device_timeout: Duration) -> Self {
        Self {
            source: SourcePipe::new(fft_size, device_timeout),
            analyser: SpectrumAnalyser::new(fft_size),
            spectrum: SpectrumBuffer::default(),
            analyzer: MetricsAnalyzer::new(),
            samples: Vec::with_capacity(fft_size),
            started: Instant::now(),
        }
    }

    /// Refresh the spectrum and advance the metrics by one scheduler tick.
    pub fn update_metrics(&mut self) -> AudioMetrics {
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.update_metrics_at(now_ms)
    }

    pub fn update_metrics_at(&mut self, now_ms: f64) -> AudioMetrics {
        if self.source.is_connected() {
            self.source.snapshot(&mut self.samples);
            self.analyser
                .process(&self.samples, self.spectrum.as_mut_slice());
        } else {
            self.spectrum.fill_synthetic(now_ms);
        }
        *self.analyzer.update(self.spectrum.as_slice(), now_ms)
    }

    pub fn metrics(&self) -> &AudioMetrics {
        self.analyzer.metrics()
    }

    pub fn spectrum(&self) -> &[u8] {
        self.spectrum.as_slice()
    }

    /// Begin binding a capture device; see [`SourcePipe::connect`].
    pub fn connect(&mut self, id: &str) -> CaptureResult<()> {
        self.source.connect(id)
    }

    /// Apply finished connection attempts. Called once per frame.
    pub fn poll_connection(&mut self) -> Vec<CaptureResult<DeviceInfo>> {
        let results = self.source.poll();
        if results.iter().any(|r| r.is_ok()) {
            let bins = self.analyser.bin_count();
            if self.spectrum.len() != bins {
                debug!("Spectrum resized to {} bins", bins);
            }
            self.spectrum.resize(bins);
            self.analyser.reset();
        }
        results
    }

    /// Unbind the device and fall back to the demo waveform.
    pub fn disconnect(&mut self) {
        self.source.disconnect();
        self.analyser.reset();
        self.analyzer.reset();
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.source.is_connecting()
    }

    pub fn current_device(&self) -> Option<&DeviceInfo> {
        self.source.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AudioEngine {
        AudioEngine::new(512, Duration::from_millis(10))
    }

    #[test]
    fn test_demo_waveform_without_device() {
        let mut engine = engine();
        assert!(!engine.is_connected());

        let mut metrics = AudioMetrics::default();
        for frame in 0..20 {
            metrics = engine.update_metrics_at(frame as f64 * 16.0);
        }
        assert!(metrics.average > 0.0);
        assert!(metrics.bass > 0.0);
        assert!(engine.spectrum().iter().any(|&b| b > 0));
        assert_eq!(engine.spectrum().len(), 256);
    }

    #[test]
    fn test_disconnect_resets_metrics() {
        let mut engine = engine();
        for frame in 0..20 {
            engine.update_metrics_at(frame as f64 * 16.0);
        }
        engine.disconnect();
        assert_eq!(*engine.metrics(), AudioMetrics::default());
        assert!(engine.current_device().is_none());
    }

    #[test]
    fn test_poll_without_requests_is_empty() {
        let mut engine = engine();
        assert!(engine.poll_connection().is_empty());
        assert_eq!(engine.spectrum().len(), 256);
    }
}
