use num_complex::Complex32;
use num_traits::Zero;
use std::f32::consts::PI;
use std::sync::Arc;

use super::{SpectrumFrame, FFT_SIZE, MAX_DB, MIN_DB, SCOPE_SIZE};
use crate::fft::{find_dft, DftBase};

/// Taper applied to a window before the transform to reduce spectral leakage.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WindowShape {
    Rectangular,
    Hann,
}

impl WindowShape {
    fn coefficients(self, n: usize) -> Vec<f32> {
        match self {
            WindowShape::Rectangular => vec![1.0; n],
            WindowShape::Hann => (0..n)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1) as f32).cos()))
                .collect(),
        }
    }
}

/// Converts completed time-domain windows into display frames.
pub struct SpectrumAnalyzer {
    plan: Arc<dyn DftBase>,
    taper: Vec<f32>,
    fft_buf: Vec<Complex32>,
    reference_db: f32,
}

impl SpectrumAnalyzer {
    pub fn new(shape: WindowShape) -> Self {
        Self {
            plan: find_dft(FFT_SIZE),
            taper: shape.coefficients(FFT_SIZE),
            fft_buf: vec![Complex32::zero(); FFT_SIZE],
            // Normalizes for FFT scaling so a full-scale sine sits near the
            // top of the display range.
            reference_db: 20.0 * (FFT_SIZE as f32).log10(),
        }
    }

    /// Runs one full analysis pass over `window`, producing a fresh frame.
    pub fn analyze(&mut self, window: &[f32; FFT_SIZE]) -> SpectrumFrame {
        //
        // Taper the samples and load them as the real input of the transform.
        //
        for i in 0..FFT_SIZE {
            self.fft_buf[i] = Complex32::new(window[i] * self.taper[i], 0.0);
        }

        self.plan.xform_inplace(&mut self.fft_buf);

        //
        // Map each display column onto its log-skewed bin and convert that
        // bin's magnitude to a normalized level.
        //
        let mut frame = SpectrumFrame::zeroed();
        for (i, level) in frame.levels.iter_mut().enumerate() {
            let mag = self.fft_buf[bin_for_column(i)].norm();
            *level = self.level_from_magnitude(mag);
        }
        frame
    }

    fn level_from_magnitude(&self, mag: f32) -> f32 {
        // The floor keeps silent bins at the display minimum instead of -inf.
        let db = 20.0 * mag.max(1e-12).log10() - self.reference_db;
        (db.clamp(MIN_DB, MAX_DB) - MIN_DB) / (MAX_DB - MIN_DB)
    }
}

/// Log-frequency skew: concentrates display resolution at low frequencies,
/// matching perceptual hearing. Monotonically non-decreasing in `column`.
pub(crate) fn bin_for_column(column: usize) -> usize {
    let proportion = column as f32 / SCOPE_SIZE as f32;
    let skewed = 1.0 - ((1.0 - proportion).ln() * 0.2).exp();
    ((skewed * (FFT_SIZE / 2) as f32) as usize).min(FFT_SIZE / 2)
}
