//! Quality-weighted fusion of per-region signals.
//!
//! A region dominated by noise (an occluded cheek, a shadowed forehead) must
//! not dominate the fused trace, so each region is weighted by how much of
//! its in-band power sits at its dominant spectral peak.

use crate::conditioning::ConditionedSignal;
use crate::spectrum::band_metrics;

/// Per-region spectral peak quality: fraction of in-band power concentrated
/// at the dominant frequency, 0.0 when the spectrum is empty
#[must_use]
pub fn peak_quality(signal: &ConditionedSignal, low_hz: f64, high_hz: f64) -> f64 {
    band_metrics(&signal.spectrum, low_hz, high_hz).map_or(0.0, |m| m.peak_ratio())
}

/// Normalized fusion weights from per-region qualities.
///
/// Weights are non-negative and sum to 1.0; when every quality is zero the
/// regions share equal weight.
#[must_use]
pub fn fusion_weights(qualities: &[f64]) -> Vec<f64> {
    let total: f64 = qualities.iter().map(|q| q.max(0.0)).sum();
    if total <= 0.0 {
        return vec![1.0 / qualities.len() as f64; qualities.len()];
    }
    qualities.iter().map(|q| q.max(0.0) / total).collect()
}

/// Sample-wise weighted sum of equal-length series.
///
/// The extractor guarantees identical lengths and sampling rates by
/// construction; mismatched lengths are a programming error.
#[must_use]
pub fn fuse_series(series: &[&[f64]], weights: &[f64]) -> Vec<f64> {
    assert_eq!(series.len(), weights.len(), "one weight per region");
    let Some(first) = series.first() else {
        return Vec::new();
    };
    let len = first.len();
    debug_assert!(series.iter().all(|s| s.len() == len));

    let mut fused = vec![0.0f64; len];
    for (region, &weight) in series.iter().zip(weights.iter()) {
        for (acc, &sample) in fused.iter_mut().zip(region.iter()) {
            *acc += weight * sample;
        }
    }
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let weights = fusion_weights(&[0.5, 0.3, 0.1]);
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(weights.iter().all(|&w| w >= 0.0));
        assert!(weights[0] > weights[1] && weights[1] > weights[2]);
    }

    #[test]
    fn test_zero_qualities_fall_back_to_equal() {
        let weights = fusion_weights(&[0.0, 0.0, 0.0]);
        assert_eq!(weights, vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn test_negative_quality_clamped() {
        let weights = fusion_weights(&[-1.0, 1.0]);
        assert_eq!(weights, vec![0.0, 1.0]);
    }

    #[test]
    fn test_fuse_series_weighted_sum() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        let fused = fuse_series(&[&a, &b], &[0.75, 0.25]);
        assert_eq!(fused, vec![1.5, 2.0, 2.5]);
    }

    #[test]
    fn test_fuse_empty() {
        assert!(fuse_series(&[], &[]).is_empty());
    }
}
