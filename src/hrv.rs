//! Heart-rate-variability statistics over beat intervals.

use crate::beats::BeatIntervals;
use crate::constants::{MIN_HRV_INTERVALS, PNN50_THRESHOLD_MS};
use serde::{Deserialize, Serialize};

/// Standard time-domain HRV metrics (all in ms except pNN50 in percent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    /// Sample standard deviation of the intervals
    pub sdnn_ms: f64,
    /// Root-mean-square of successive interval differences
    pub rmssd_ms: f64,
    /// Percent of successive differences exceeding 50 ms
    pub pnn50_pct: f64,
}

/// Compute HRV metrics, or `None` when fewer than three intervals exist.
///
/// Below the minimum the metrics are "unavailable", not an error; callers
/// degrade gracefully.
#[must_use]
pub fn compute_hrv(intervals: &BeatIntervals) -> Option<HrvMetrics> {
    let rr = intervals.as_slice();
    if rr.len() < MIN_HRV_INTERVALS {
        return None;
    }

    let n = rr.len() as f64;
    let mean = rr.iter().sum::<f64>() / n;
    // Sample (ddof = 1) standard deviation
    let sdnn_ms = (rr.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();

    let diffs: Vec<f64> = rr.windows(2).map(|w| w[1] - w[0]).collect();
    let rmssd_ms =
        (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();
    let over_threshold = diffs
        .iter()
        .filter(|d| d.abs() > PNN50_THRESHOLD_MS)
        .count();
    let pnn50_pct = over_threshold as f64 / diffs.len() as f64 * 100.0;

    Some(HrvMetrics {
        sdnn_ms,
        rmssd_ms,
        pnn50_pct,
    })
}
