//! Welch-style power spectral density estimation.
//!
//! Shared by the conditioner (SNR), region fusion (peak quality), and the
//! spectral heart-rate estimator. Segments are Hann-windowed, mean-removed,
//! overlapped 50 %, and zero-padded so the bin spacing stays fine enough for
//! BPM-level readout; the band peak is refined by quadratic interpolation.

use crate::constants::{WELCH_MAX_SEGMENT, WELCH_MIN_NFFT, WELCH_OVERLAP};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// One-sided power spectral density curve
#[derive(Debug, Clone, Default)]
pub struct PowerSpectrum {
    /// Bin center frequencies (Hz)
    pub freqs: Vec<f64>,
    /// Power per bin (arbitrary units, consistent across bins)
    pub power: Vec<f64>,
}

/// Power split and dominant peak of a spectrum restricted to one band
#[derive(Debug, Clone, Copy)]
pub struct BandMetrics {
    /// Interpolated frequency of maximum in-band power (Hz)
    pub peak_freq_hz: f64,
    /// Power at the peak bin
    pub peak_power: f64,
    /// Total power inside the band
    pub in_band_power: f64,
    /// Total power outside the band (DC bin excluded)
    pub out_band_power: f64,
}

impl BandMetrics {
    /// In-band to out-of-band power ratio
    #[must_use]
    pub fn snr(&self) -> f64 {
        self.in_band_power / self.out_band_power.max(f64::MIN_POSITIVE)
    }

    /// Fraction of in-band power concentrated at the dominant peak bin
    #[must_use]
    pub fn peak_ratio(&self) -> f64 {
        if self.in_band_power <= 0.0 {
            0.0
        } else {
            self.peak_power / self.in_band_power
        }
    }
}

/// Welch averaged periodogram of a real signal.
///
/// Returns an empty spectrum for signals too short to window (< 8 samples).
#[must_use]
pub fn welch_psd(signal: &[f64], fs: f64) -> PowerSpectrum {
    let n = signal.len();
    if n < 8 || fs <= 0.0 {
        return PowerSpectrum::default();
    }

    let nperseg = WELCH_MAX_SEGMENT.min(n);
    let step = ((nperseg as f64 * (1.0 - WELCH_OVERLAP)) as usize).max(1);
    let nfft = WELCH_MIN_NFFT.max(nperseg.next_power_of_two());

    let window: Vec<f64> = (0..nperseg)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (nperseg - 1) as f64).cos())
        })
        .collect();
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nfft);

    let half = nfft / 2 + 1;
    let mut accumulated = vec![0.0f64; half];
    let mut segments = 0usize;
    let mut buffer = vec![Complex64::default(); nfft];

    let mut start = 0;
    while start + nperseg <= n {
        let segment = &signal[start..start + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;

        for slot in buffer.iter_mut() {
            *slot = Complex64::default();
        }
        for (i, (&s, &w)) in segment.iter().zip(window.iter()).enumerate() {
            buffer[i] = Complex64::new((s - mean) * w, 0.0);
        }
        fft.process(&mut buffer);

        for (k, acc) in accumulated.iter_mut().enumerate() {
            let mut p = buffer[k].norm_sqr() / (fs * window_power);
            // One-sided spectrum: fold negative frequencies in
            if k != 0 && k != nfft / 2 {
                p *= 2.0;
            }
            *acc += p;
        }
        segments += 1;
        start += step;
    }

    if segments == 0 {
        return PowerSpectrum::default();
    }

    let df = fs / nfft as f64;
    PowerSpectrum {
        freqs: (0..half).map(|k| k as f64 * df).collect(),
        power: accumulated
            .into_iter()
            .map(|p| p / segments as f64)
            .collect(),
    }
}

/// Restrict a spectrum to `[low_hz, high_hz]` and locate the dominant peak.
///
/// Returns `None` when no bin falls inside the band.
#[must_use]
pub fn band_metrics(spectrum: &PowerSpectrum, low_hz: f64, high_hz: f64) -> Option<BandMetrics> {
    let mut in_band_power = 0.0;
    let mut out_band_power = 0.0;
    let mut peak_bin: Option<usize> = None;
    let mut peak_power = 0.0;

    for (k, (&f, &p)) in spectrum.freqs.iter().zip(spectrum.power.iter()).enumerate() {
        if f >= low_hz && f <= high_hz {
            in_band_power += p;
            if peak_bin.is_none() || p > peak_power {
                peak_bin = Some(k);
                peak_power = p;
            }
        } else if k != 0 {
            // DC excluded so a residual offset cannot swamp the split
            out_band_power += p;
        }
    }

    let peak_bin = peak_bin?;
    let df = if spectrum.freqs.len() > 1 {
        spectrum.freqs[1] - spectrum.freqs[0]
    } else {
        0.0
    };

    Some(BandMetrics {
        peak_freq_hz: refine_peak(spectrum, peak_bin, df),
        peak_power,
        in_band_power,
        out_band_power,
    })
}

/// Quadratic interpolation of the peak position across its two neighbors
fn refine_peak(spectrum: &PowerSpectrum, peak_bin: usize, df: f64) -> f64 {
    let center = spectrum.freqs[peak_bin];
    if peak_bin == 0 || peak_bin + 1 >= spectrum.power.len() || df <= 0.0 {
        return center;
    }
    let y1 = spectrum.power[peak_bin - 1];
    let y2 = spectrum.power[peak_bin];
    let y3 = spectrum.power[peak_bin + 1];
    let denom = y1 - 2.0 * y2 + y3;
    if denom.abs() < 1e-30 || !denom.is_finite() {
        return center;
    }
    let delta = 0.5 * (y1 - y3) / denom;
    if !(-1.0..=1.0).contains(&delta) {
        return center;
    }
    center + delta * df
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, seconds: f64) -> Vec<f64> {
        let n = (fs * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_welch_peak_at_sine_frequency() {
        let signal = sine(1.2, 30.0, 10.0);
        let spectrum = welch_psd(&signal, 30.0);
        let metrics = band_metrics(&spectrum, 0.7, 4.0).unwrap();
        assert!(
            (metrics.peak_freq_hz - 1.2).abs() < 0.05,
            "peak at {} Hz",
            metrics.peak_freq_hz
        );
        assert!(metrics.snr() > 2.0);
    }

    #[test]
    fn test_short_signal_yields_empty_spectrum() {
        let spectrum = welch_psd(&[1.0, 2.0, 3.0], 30.0);
        assert!(spectrum.freqs.is_empty());
        assert!(band_metrics(&spectrum, 0.7, 4.0).is_none());
    }

    #[test]
    fn test_out_of_band_noise_lowers_snr() {
        let fs = 30.0;
        let clean = sine(1.2, fs, 10.0);
        let noisy: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, &s)| s + 2.0 * (2.0 * std::f64::consts::PI * 6.0 * i as f64 / fs).sin())
            .collect();
        let snr_clean = band_metrics(&welch_psd(&clean, fs), 0.7, 4.0).unwrap().snr();
        let snr_noisy = band_metrics(&welch_psd(&noisy, fs), 0.7, 4.0).unwrap().snr();
        assert!(snr_noisy < snr_clean);
    }

    #[test]
    fn test_band_metrics_band_outside_spectrum() {
        let signal = sine(1.0, 30.0, 5.0);
        let spectrum = welch_psd(&signal, 30.0);
        assert!(band_metrics(&spectrum, 100.0, 200.0).is_none());
    }
}
