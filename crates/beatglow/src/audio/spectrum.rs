//! Byte spectrum storage and the demo waveform used when no device is bound.

use beatglow_api::DEFAULT_SPECTRUM_LEN;

/// Fixed-length byte spectrum, refreshed in place every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumBuffer {
    bins: Vec<u8>,
}

impl Default for SpectrumBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SPECTRUM_LEN)
    }
}

impl SpectrumBuffer {
    pub fn new(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bins
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bins
    }

    /// Change the bin count, zeroing the contents.
    pub fn resize(&mut self, len: usize) {
        self.bins.clear();
        self.bins.resize(len, 0);
    }

    /// Fill with two interfering sine sweeps that drift over time.
    pub fn fill_synthetic(&mut self, now_ms: f64) {
        for (i, bin) in self.bins.iter_mut().enumerate() {
            let i = i as f64;
            let value = (i * 0.1 + now_ms * 0.002).sin() * 50.0
                + (i * 0.05 + now_ms * 0.001).sin() * 30.0
                + 80.0;
            *bin = value.clamp(0.0, 255.0) as u8;
        }
    }
}
