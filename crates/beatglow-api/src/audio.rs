//! Audio metrics handed to plugins each frame.

/// Spectrum length used before any capture device negotiates its own.
pub const DEFAULT_SPECTRUM_LEN: usize = 256;

/// Per-frame snapshot of the analysed spectrum.
///
/// Band energies are normalised to `[0, 1]`. Between analysis ticks the
/// previous snapshot is handed out unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioMetrics {
    /// Smoothed energy of the lowest 10% of bins
    pub bass: f32,
    /// Smoothed energy of bins 10%..50%
    pub mid: f32,
    /// Smoothed energy of the upper half
    pub high: f32,
    /// Mean of the whole spectrum
    pub average: f32,
    /// How far the bass sits above its rolling baseline (0-1)
    pub beat_intensity: f32,
    /// True on the analysis tick a beat was declared
    pub is_beat: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_silent() {
        let metrics = AudioMetrics::default();
        assert_eq!(metrics.bass, 0.0);
        assert_eq!(metrics.average, 0.0);
        assert!(!metrics.is_beat);
        assert_eq!(metrics.beat_intensity, 0.0);
    }
}
