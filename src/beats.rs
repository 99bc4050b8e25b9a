//! Time-domain beat detection and inter-beat intervals.
//!
//! Detects pulse peaks in the conditioned signal using a refractory distance
//! derived from the spectral heart-rate estimate, then converts peak spacing
//! to inter-beat intervals. An empty result means "HRV unavailable", never an
//! error.

use crate::constants::{
    MAX_IBI_MS, MIN_IBI_MS, MIN_PEAKS, PEAK_MIN_DISTANCE_FRACTION, PEAK_PROMINENCE_SIGMA,
    PEAK_RETRY_DISTANCE_FRACTION,
};

/// Inter-beat intervals in milliseconds.
///
/// Invariant: every value lies inside the physiological window
/// ([`MIN_IBI_MS`], [`MAX_IBI_MS`]); out-of-window spacings are dropped as
/// detection artifacts before construction.
#[derive(Debug, Clone, Default)]
pub struct BeatIntervals {
    intervals_ms: Vec<f64>,
    /// Number of peaks the intervals were derived from
    pub peak_count: usize,
}

impl BeatIntervals {
    /// Interval values in ms
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.intervals_ms
    }

    /// Number of intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals_ms.len()
    }

    /// True when no usable interval was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals_ms.is_empty()
    }
}

/// Detect beats and derive inter-beat intervals.
///
/// `expected_bpm` (the spectral estimate) sets the refractory distance; when
/// fewer than [`MIN_PEAKS`] peaks are found the detection retries once with a
/// looser distance before giving up.
#[must_use]
pub fn detect_beat_intervals(signal: &[f64], sample_rate: f64, expected_bpm: f64) -> BeatIntervals {
    if signal.len() < 3 || sample_rate <= 0.0 || expected_bpm <= 0.0 {
        return BeatIntervals::default();
    }

    let period_samples = 60.0 / expected_bpm * sample_rate;
    let strict = ((period_samples * PEAK_MIN_DISTANCE_FRACTION).round() as usize).max(1);
    let mut peaks = find_peaks(signal, strict);

    if peaks.len() < MIN_PEAKS {
        let loose = ((period_samples * PEAK_RETRY_DISTANCE_FRACTION).round() as usize).max(1);
        log::debug!(
            "only {} peaks at distance {strict}, retrying at {loose}",
            peaks.len()
        );
        peaks = find_peaks(signal, loose);
    }
    if peaks.len() < MIN_PEAKS {
        return BeatIntervals {
            intervals_ms: Vec::new(),
            peak_count: peaks.len(),
        };
    }

    let intervals_ms: Vec<f64> = peaks
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / sample_rate * 1000.0)
        .filter(|ms| (MIN_IBI_MS..=MAX_IBI_MS).contains(ms))
        .collect();

    BeatIntervals {
        intervals_ms,
        peak_count: peaks.len(),
    }
}

/// Local maxima above mean + k*sigma with a refractory minimum distance
fn find_peaks(signal: &[f64], min_distance: usize) -> Vec<usize> {
    let n = signal.len();
    let mean = signal.iter().sum::<f64>() / n as f64;
    let std = (signal.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt();
    let threshold = mean + PEAK_PROMINENCE_SIGMA * std;

    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;
    for i in 1..n - 1 {
        if signal[i] > threshold && signal[i] >= signal[i - 1] && signal[i] >= signal[i + 1] {
            if let Some(last) = last_peak {
                if i - last < min_distance {
                    // Keep the taller of two peaks inside the refractory gap
                    if signal[i] > signal[last] {
                        if let Some(slot) = peaks.last_mut() {
                            *slot = i;
                        }
                        last_peak = Some(i);
                    }
                    continue;
                }
            }
            peaks.push(i);
            last_peak = Some(i);
        }
    }
    peaks
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
    fn test_sine_intervals_match_period() {
        let fs = 30.0;
        let signal = sine(1.2, fs, 10.0);
        let intervals = detect_beat_intervals(&signal, fs, 72.0);
        assert!(intervals.len() >= 8, "found {} intervals", intervals.len());
        for &ms in intervals.as_slice() {
            assert!((ms - 833.3).abs() < 70.0, "interval {ms} ms");
        }
    }

    #[test]
    fn test_too_few_peaks_is_empty_not_error() {
        let fs = 30.0;
        // Barely over one beat of signal
        let signal = sine(1.0, fs, 1.2);
        let intervals = detect_beat_intervals(&signal, fs, 60.0);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_out_of_window_spacings_dropped() {
        let fs = 30.0;
        // 0.2 Hz: 5 s between peaks, far beyond the 2000 ms ceiling
        let signal = sine(0.2, fs, 20.0);
        let intervals = detect_beat_intervals(&signal, fs, 12.0);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_invalid_inputs_yield_empty() {
        assert!(detect_beat_intervals(&[], 30.0, 72.0).is_empty());
        assert!(detect_beat_intervals(&[1.0, 2.0, 1.0], 0.0, 72.0).is_empty());
        assert!(detect_beat_intervals(&[1.0, 2.0, 1.0], 30.0, 0.0).is_empty());
    }
}
