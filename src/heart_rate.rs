//! Spectral heart-rate estimation.
//!
//! Finds the dominant frequency in the heart-rate band of a conditioned (or
//! fused) signal and converts it to BPM. Intentionally independent of the
//! time-domain beat detector in `beats`; the two act as a built-in
//! cross-check and both are always computed.

use crate::constants::{
    HR_SANITY_MAX_BPM, HR_SANITY_MIN_BPM, SNR_HIGH_CONFIDENCE, SNR_MEDIUM_CONFIDENCE,
};
use crate::spectrum::{band_metrics, PowerSpectrum};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Confidence label attached to the spectral estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeartRateConfidence {
    High,
    Medium,
    Low,
}

/// Spectral heart-rate estimate
#[derive(Debug, Clone, Copy)]
pub struct HeartRateEstimate {
    /// Beats per minute
    pub bpm: f64,
    /// Confidence label from the in-band/out-of-band power ratio
    pub confidence: HeartRateConfidence,
    /// The power ratio the label was derived from
    pub snr: f64,
    /// Fraction of in-band power at the dominant peak
    pub peak_ratio: f64,
}

/// Estimate heart rate from a PSD restricted to the given band.
///
/// # Errors
///
/// - [`Error::DegenerateSignal`] when the spectrum holds no usable band power
/// - [`Error::ImplausibleHeartRate`] when the estimate falls outside the
///   sanity window
pub fn estimate_heart_rate(
    spectrum: &PowerSpectrum,
    low_hz: f64,
    high_hz: f64,
) -> Result<HeartRateEstimate> {
    let metrics = band_metrics(spectrum, low_hz, high_hz).ok_or(Error::DegenerateSignal {
        stage: "spectral estimation",
    })?;
    if metrics.in_band_power <= 0.0 {
        return Err(Error::DegenerateSignal {
            stage: "spectral estimation",
        });
    }

    let bpm = metrics.peak_freq_hz * 60.0;
    if !(HR_SANITY_MIN_BPM..=HR_SANITY_MAX_BPM).contains(&bpm) {
        return Err(Error::ImplausibleHeartRate {
            bpm,
            min: HR_SANITY_MIN_BPM,
            max: HR_SANITY_MAX_BPM,
        });
    }

    let snr = metrics.snr();
    let confidence = if snr >= SNR_HIGH_CONFIDENCE {
        HeartRateConfidence::High
    } else if snr >= SNR_MEDIUM_CONFIDENCE {
        HeartRateConfidence::Medium
    } else {
        HeartRateConfidence::Low
    };

    Ok(HeartRateEstimate {
        bpm,
        confidence,
        snr,
        peak_ratio: metrics.peak_ratio(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::welch_psd;

    fn sine(freq: f64, fs: f64, seconds: f64) -> Vec<f64> {
        let n = (fs * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_clean_sine_estimates_72_bpm_high_confidence() {
        let spectrum = welch_psd(&sine(1.2, 30.0, 10.0), 30.0);
        let estimate = estimate_heart_rate(&spectrum, 0.7, 4.0).unwrap();
        assert!(
            (estimate.bpm - 72.0).abs() <= 2.0,
            "estimated {} BPM",
            estimate.bpm
        );
        assert_eq!(estimate.confidence, HeartRateConfidence::High);
    }

    #[test]
    fn test_empty_spectrum_is_degenerate() {
        let spectrum = PowerSpectrum::default();
        assert!(matches!(
            estimate_heart_rate(&spectrum, 0.7, 4.0),
            Err(Error::DegenerateSignal { .. })
        ));
    }

    #[test]
    fn test_confidence_degrades_with_noise() {
        let fs = 30.0;
        let clean = sine(1.2, fs, 10.0);
        // Heavy in-band-adjacent noise flattens the ratio
        let noisy: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                s + 4.0 * (2.0 * std::f64::consts::PI * 6.5 * i as f64 / fs).sin()
                    + 4.0 * (2.0 * std::f64::consts::PI * 10.0 * i as f64 / fs).sin()
            })
            .collect();
        let estimate = estimate_heart_rate(&welch_psd(&noisy, fs), 0.7, 4.0).unwrap();
        assert_ne!(estimate.confidence, HeartRateConfidence::High);
    }
}
