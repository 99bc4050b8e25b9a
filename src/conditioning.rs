//! Signal conditioning: gap filling, detrending, normalization, zero-phase
//! band-pass filtering, and quality assessment.
//!
//! The band-pass is an FFT-domain mask with raised-cosine transition bands.
//! Masking in the frequency domain introduces no group delay, so peak timing
//! survives for the beat-interval stage downstream. The spectrum and SNR are
//! taken from the normalized signal *before* band limiting; a post-filter
//! ratio would only measure filter leakage and read as clean for any input.

use crate::constants::{
    DEGENERATE_VARIANCE_EPSILON, LOW_VARIANCE_THRESHOLD, MAX_BAND_EDGE_FS_FRACTION,
    MAX_MISSING_FRACTION_WARN, MOTION_ARTIFACT_SIGMA,
};
use crate::spectrum::{band_metrics, welch_psd, PowerSpectrum};
use crate::{Error, Result};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// Width of the raised-cosine transition on each band edge (Hz)
const TRANSITION_WIDTH_HZ: f64 = 0.2;

/// Quality flags raised during conditioning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityFlags {
    /// Raw series variance was below the low-variance threshold
    pub low_variance: bool,
    /// A sample-to-sample jump exceeded the motion-artifact threshold
    pub motion_artifact: bool,
    /// Missing fraction exceeded the interpolation warning threshold
    pub excess_interpolation: bool,
}

/// A channel series after conditioning, with its spectral metadata
#[derive(Debug, Clone)]
pub struct ConditionedSignal {
    /// Band-limited samples for beat timing (one per processed frame)
    pub samples: Vec<f64>,
    /// Detrended, unit-variance samples before band limiting, for spectral
    /// scoring
    pub normalized: Vec<f64>,
    /// Sampling rate in Hz
    pub sample_rate: f64,
    /// Welch power spectral density of the pre-filter normalized samples
    pub spectrum: PowerSpectrum,
    /// In-band to out-of-band power ratio, measured before band limiting
    pub snr: f64,
    /// Quality flags raised while conditioning
    pub flags: QualityFlags,
}

/// Signal conditioner for one heart-rate band
pub struct SignalConditioner {
    sample_rate: f64,
    low_hz: f64,
    high_hz: f64,
}

impl SignalConditioner {
    /// Create a conditioner, validating the band against the sampling rate.
    ///
    /// A valid upper edge that sits above what the sampling rate can carry is
    /// capped at [`MAX_BAND_EDGE_FS_FRACTION`] of the rate, so a slow but
    /// legitimate clip narrows the band instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilterConfiguration`] when the edges are not
    /// `0 < low < high`, or when the lower edge is beyond even the capped
    /// upper edge.
    pub fn new(sample_rate: f64, low_hz: f64, high_hz: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::FilterConfiguration(format!(
                "sampling rate {sample_rate} Hz is not positive"
            )));
        }
        if !(low_hz > 0.0 && low_hz < high_hz) {
            return Err(Error::FilterConfiguration(format!(
                "band [{low_hz}, {high_hz}] Hz is not an increasing positive range"
            )));
        }

        let max_edge = MAX_BAND_EDGE_FS_FRACTION * sample_rate;
        let capped_high = high_hz.min(max_edge);
        if capped_high < high_hz {
            log::warn!(
                "upper band edge {high_hz} Hz capped to {capped_high:.2} Hz for \
                 {sample_rate} Hz sampling"
            );
        }
        if low_hz >= capped_high {
            return Err(Error::FilterConfiguration(format!(
                "band [{low_hz}, {high_hz}] Hz cannot fit under a {sample_rate} Hz \
                 sampling rate"
            )));
        }

        Ok(Self {
            sample_rate,
            low_hz,
            high_hz: capped_high,
        })
    }

    /// Condition one channel series (NaN marks a frame without a face).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSignal`] when the series has no finite
    /// samples or its variance collapses to numerical zero.
    pub fn condition(&self, series: &[f64]) -> Result<ConditionedSignal> {
        let mut flags = QualityFlags::default();

        let missing = series.iter().filter(|v| !v.is_finite()).count();
        let missing_fraction = missing as f64 / series.len().max(1) as f64;
        if missing_fraction > MAX_MISSING_FRACTION_WARN {
            flags.excess_interpolation = true;
            log::warn!(
                "interpolating {:.0}% of samples; signal quality will suffer",
                100.0 * missing_fraction
            );
        }

        let filled = fill_gaps(series).ok_or(Error::DegenerateSignal { stage: "gap fill" })?;
        if filled.len() < 8 {
            return Err(Error::DegenerateSignal { stage: "gap fill" });
        }

        if variance(&filled) < LOW_VARIANCE_THRESHOLD {
            flags.low_variance = true;
        }

        let detrended = remove_linear_trend(&filled);

        let var = variance(&detrended);
        if var < DEGENERATE_VARIANCE_EPSILON {
            return Err(Error::DegenerateSignal {
                stage: "normalization",
            });
        }
        let mean = detrended.iter().sum::<f64>() / detrended.len() as f64;
        let std = var.sqrt();
        let normalized: Vec<f64> = detrended.iter().map(|v| (v - mean) / std).collect();

        // Motion artifacts: jumps far outside the signal's own spread
        let max_jump = normalized
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0f64, f64::max);
        if max_jump > MOTION_ARTIFACT_SIGMA {
            flags.motion_artifact = true;
        }

        // Score the spectrum before band limiting: after the mask the
        // out-of-band bins hold only leakage and the ratio saturates
        let spectrum = welch_psd(&normalized, self.sample_rate);
        let snr = band_metrics(&spectrum, self.low_hz, self.high_hz)
            .map_or(0.0, |m| m.snr());

        let samples = self.bandpass_zero_phase(&normalized);

        Ok(ConditionedSignal {
            samples,
            normalized,
            sample_rate: self.sample_rate,
            spectrum,
            snr,
            flags,
        })
    }

    /// Zero-phase band-pass via a full-length FFT mask.
    ///
    /// The mask is 1 inside the band, 0 outside, with raised-cosine ramps of
    /// [`TRANSITION_WIDTH_HZ`] on each edge applied symmetrically to positive
    /// and negative frequencies, so the output stays real.
    fn bandpass_zero_phase(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 2 {
            return signal.to_vec();
        }

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);

        let mut buffer: Vec<Complex64> =
            signal.iter().map(|&s| Complex64::new(s, 0.0)).collect();
        forward.process(&mut buffer);

        let df = self.sample_rate / n as f64;
        for (k, value) in buffer.iter_mut().enumerate() {
            let freq = if k <= n / 2 {
                k as f64 * df
            } else {
                (n - k) as f64 * df
            };
            *value *= band_gain(freq, self.low_hz, self.high_hz);
        }

        inverse.process(&mut buffer);
        buffer.iter().map(|c| c.re / n as f64).collect()
    }
}

/// Raised-cosine band gain at one frequency
fn band_gain(freq: f64, low: f64, high: f64) -> f64 {
    let ramp = TRANSITION_WIDTH_HZ;
    if freq < low - ramp || freq > high + ramp {
        0.0
    } else if freq < low {
        0.5 * (1.0 + (std::f64::consts::PI * (freq - low) / ramp).cos())
    } else if freq > high {
        0.5 * (1.0 + (std::f64::consts::PI * (freq - high) / ramp).cos())
    } else {
        1.0
    }
}

/// Fill NaN gaps by linear interpolation, with forward/backward fill at the
/// edges. Returns `None` when the series holds no finite sample at all.
#[must_use]
pub fn fill_gaps(series: &[f64]) -> Option<Vec<f64>> {
    let first_valid = series.iter().position(|v| v.is_finite())?;
    let last_valid = series.iter().rposition(|v| v.is_finite())?;

    let mut filled = series.to_vec();

    // Backward fill the head, forward fill the tail
    for i in 0..first_valid {
        filled[i] = series[first_valid];
    }
    for value in filled.iter_mut().skip(last_valid + 1) {
        *value = series[last_valid];
    }

    // Linear interpolation between interior anchor points
    let mut prev = first_valid;
    for i in first_valid + 1..=last_valid {
        if filled[i].is_finite() {
            if i - prev > 1 {
                let span = (i - prev) as f64;
                let (a, b) = (filled[prev], filled[i]);
                for (offset, slot) in filled[prev + 1..i].iter_mut().enumerate() {
                    *slot = a + (b - a) * (offset + 1) as f64 / span;
                }
            }
            prev = i;
        }
    }

    Some(filled)
}

/// Remove the least-squares linear trend from a series
#[must_use]
pub fn remove_linear_trend(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n < 2 {
        return series.to_vec();
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = series.iter().sum::<f64>() / nf;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = if den.abs() > 0.0 { num / den } else { 0.0 };
    series
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (y_mean + slope * (i as f64 - x_mean)))
        .collect()
}

/// Population variance of a series
#[must_use]
pub fn variance(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / series.len() as f64
}
