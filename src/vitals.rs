//! Derived experimental vitals: stress index, blood pressure, SpO2 proxy.
//!
//! Every estimator here is explicitly experimental: each is independently
//! gated, returns `None` ("unavailable") instead of a fabricated number when
//! its gate fails, and the assembled [`VitalsResult`] carries a fixed
//! disclaimer. A failure in one estimator never blocks the others.

use crate::constants::{
    BP_BASELINE_DIASTOLIC, BP_BASELINE_SYSTOLIC, BP_DIA_MAX, BP_DIA_MIN, BP_DIA_PER_BPM,
    BP_DIA_PER_MS_SDNN, BP_MIN_PULSE_PRESSURE, BP_REFERENCE_HR_BPM, BP_REFERENCE_SDNN_MS,
    BP_SYS_MAX, BP_SYS_MIN, BP_SYS_PER_BPM, BP_SYS_PER_MS_SDNN, EXPERIMENTAL_DISCLAIMER,
    SPO2_HR_MAX_BPM, SPO2_HR_MIN_BPM, SPO2_INTERCEPT, SPO2_MAX_PCT, SPO2_MIN_DURATION_SEC,
    SPO2_MIN_PCT, SPO2_RATIO_MAX, SPO2_RATIO_MIN, SPO2_SLOPE, STRESS_INDEX_MAX, STRESS_INDEX_MIN,
    STRESS_SDNN_HIGH_MS, STRESS_SDNN_LOW_MS, STRESS_SDNN_MODERATE_MS,
};
use crate::heart_rate::HeartRateConfidence;
use crate::hrv::HrvMetrics;
use serde::{Deserialize, Serialize};

/// Experimental blood-pressure estimate (mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Complete vitals output for one clip, serializable as a flat record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsResult {
    /// Heart rate in beats per minute
    pub heart_rate_bpm: f64,
    /// Confidence label for the spectral estimate
    pub heart_rate_confidence: HeartRateConfidence,
    /// SDNN in ms, `None` when fewer than 3 beat intervals were found
    pub hrv_sdnn_ms: Option<f64>,
    /// RMSSD in ms
    pub hrv_rmssd_ms: Option<f64>,
    /// pNN50 in percent
    pub hrv_pnn50_pct: Option<f64>,
    /// Experimental stress index on a 0-10 scale
    pub stress_index: Option<f64>,
    /// Experimental systolic blood pressure (mmHg)
    pub bp_systolic: Option<f64>,
    /// Experimental diastolic blood pressure (mmHg)
    pub bp_diastolic: Option<f64>,
    /// Experimental SpO2 proxy in percent, `None` when gated out
    pub spo2_pct: Option<f64>,
    /// Fraction of frames with a detected face
    pub detection_ratio: f64,
    /// Aggregate confidence percent (peak concentration + detection)
    pub confidence_percent: u32,
    /// Signal quality on a 0-10 scale
    pub signal_quality_score: f64,
    /// Fixed disclaimer covering every experimental field
    pub disclaimer: String,
}

/// Inverse piecewise-linear stress index from SDNN (ms), clamped to
/// [0.5, 10.0]; lower HRV maps to higher stress
#[must_use]
pub fn stress_index_from_sdnn(sdnn_ms: f64) -> f64 {
    let stress = if sdnn_ms < STRESS_SDNN_HIGH_MS {
        // 0 ms -> 10.0, 25 ms -> 8.1
        10.0 - (sdnn_ms / STRESS_SDNN_HIGH_MS) * 1.9
    } else if sdnn_ms <= STRESS_SDNN_MODERATE_MS {
        // 25 ms -> 8.0, 40 ms -> 4.1
        8.0 - ((sdnn_ms - STRESS_SDNN_HIGH_MS) / (STRESS_SDNN_MODERATE_MS - STRESS_SDNN_HIGH_MS))
            * 3.9
    } else if sdnn_ms <= STRESS_SDNN_LOW_MS {
        // 40 ms -> 4.0, 100 ms -> 1.1
        4.0 - ((sdnn_ms - STRESS_SDNN_MODERATE_MS) / (STRESS_SDNN_LOW_MS - STRESS_SDNN_MODERATE_MS))
            * 2.9
    } else {
        1.0
    };
    stress.clamp(STRESS_INDEX_MIN, STRESS_INDEX_MAX)
}

/// Experimental blood pressure from heart rate and SDNN.
///
/// Baseline 120/80 adjusted linearly by heart-rate deviation from 70 BPM and
/// SDNN deviation from 50 ms, clamped to physiologic bounds with the
/// diastolic forced at least 20 mmHg below the systolic.
#[must_use]
pub fn estimate_blood_pressure(heart_rate_bpm: f64, sdnn_ms: f64) -> BloodPressure {
    let hr_deviation = heart_rate_bpm - BP_REFERENCE_HR_BPM;
    let sdnn_deviation = BP_REFERENCE_SDNN_MS - sdnn_ms;

    let systolic = (BP_BASELINE_SYSTOLIC
        + hr_deviation * BP_SYS_PER_BPM
        + sdnn_deviation * BP_SYS_PER_MS_SDNN)
        .clamp(BP_SYS_MIN, BP_SYS_MAX);
    let mut diastolic = (BP_BASELINE_DIASTOLIC
        + hr_deviation * BP_DIA_PER_BPM
        + sdnn_deviation * BP_DIA_PER_MS_SDNN)
        .clamp(BP_DIA_MIN, BP_DIA_MAX);

    if diastolic > systolic - BP_MIN_PULSE_PRESSURE {
        diastolic = systolic - BP_MIN_PULSE_PRESSURE;
    }

    BloodPressure {
        systolic,
        diastolic,
    }
}

/// Experimental SpO2 proxy via ratio-of-ratios over the fused raw red and
/// green series.
///
/// `R = (AC_red / DC_red) / (AC_green / DC_green)` with AC the standard
/// deviation and DC the mean, mapped linearly to a percentage. Returns `None`
/// unless every safety gate passes: minimum duration, plausible heart rate,
/// strictly positive DC and AC terms, and `R` inside the accepted window.
#[must_use]
pub fn estimate_spo2(
    red: &[f64],
    green: &[f64],
    sample_rate: f64,
    heart_rate_bpm: Option<f64>,
) -> Option<f64> {
    let min_samples = (sample_rate * SPO2_MIN_DURATION_SEC) as usize;
    if red.len() < min_samples || green.len() < min_samples {
        return None;
    }

    let hr = heart_rate_bpm?;
    if !(SPO2_HR_MIN_BPM..=SPO2_HR_MAX_BPM).contains(&hr) {
        return None;
    }

    let dc_red = mean(red);
    let dc_green = mean(green);
    if dc_red <= 0.0 || dc_green <= 0.0 {
        return None;
    }

    let ac_red = std_dev(red);
    let ac_green = std_dev(green);
    if ac_red <= 0.0 || ac_green <= 0.0 {
        return None;
    }

    let ratio = (ac_red / dc_red) / (ac_green / dc_green);
    if !(SPO2_RATIO_MIN..=SPO2_RATIO_MAX).contains(&ratio) {
        return None;
    }

    Some((SPO2_INTERCEPT - SPO2_SLOPE * ratio).clamp(SPO2_MIN_PCT, SPO2_MAX_PCT))
}

/// Assemble the flat vitals record from the per-stage outputs
#[must_use]
pub fn assemble_vitals(
    heart_rate_bpm: f64,
    heart_rate_confidence: HeartRateConfidence,
    hrv: Option<HrvMetrics>,
    blood_pressure: Option<BloodPressure>,
    spo2_pct: Option<f64>,
    detection_ratio: f64,
    peak_ratio: f64,
) -> VitalsResult {
    let stress_index = hrv.map(|m| stress_index_from_sdnn(m.sdnn_ms));
    let confidence_percent =
        ((peak_ratio * 100.0 + detection_ratio * 50.0).round() as u32).min(100);
    let signal_quality_score = (peak_ratio * 10.0).min(10.0);

    VitalsResult {
        heart_rate_bpm,
        heart_rate_confidence,
        hrv_sdnn_ms: hrv.map(|m| m.sdnn_ms),
        hrv_rmssd_ms: hrv.map(|m| m.rmssd_ms),
        hrv_pnn50_pct: hrv.map(|m| m.pnn50_pct),
        stress_index,
        bp_systolic: blood_pressure.map(|bp| bp.systolic),
        bp_diastolic: blood_pressure.map(|bp| bp.diastolic),
        spo2_pct,
        detection_ratio,
        confidence_percent,
        signal_quality_score,
        disclaimer: EXPERIMENTAL_DISCLAIMER.to_string(),
    }
}

fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

fn std_dev(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let m = mean(series);
    (series.iter().map(|v| (v - m).powi(2)).sum::<f64>() / series.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_breakpoints() {
        assert!((stress_index_from_sdnn(0.0) - 10.0).abs() < 1e-9);
        assert!((stress_index_from_sdnn(25.0) - 8.0).abs() < 1e-9);
        assert!((stress_index_from_sdnn(40.0) - 4.1).abs() < 1e-9);
        assert!((stress_index_from_sdnn(100.0) - 1.1).abs() < 1e-9);
        assert!((stress_index_from_sdnn(150.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stress_monotone_decreasing_in_sdnn() {
        let values: Vec<f64> = (0..200).map(|s| stress_index_from_sdnn(s as f64)).collect();
        for pair in values.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12);
        }
    }

    #[test]
    fn test_bp_baseline_at_references() {
        let bp = estimate_blood_pressure(70.0, 50.0);
        assert_eq!(bp.systolic, 120.0);
        assert_eq!(bp.diastolic, 80.0);
    }

    #[test]
    fn test_bp_clamps_and_pulse_pressure() {
        let bp = estimate_blood_pressure(200.0, 5.0);
        assert!(bp.systolic <= BP_SYS_MAX);
        assert!(bp.diastolic <= bp.systolic - BP_MIN_PULSE_PRESSURE);

        let bp = estimate_blood_pressure(30.0, 200.0);
        assert!(bp.systolic >= BP_SYS_MIN);
        assert!(bp.diastolic >= BP_DIA_MIN);
    }

    fn spo2_fixture(pulse_amp_red: f64, pulse_amp_green: f64) -> (Vec<f64>, Vec<f64>) {
        let fs = 30.0;
        let n = (fs * 10.0) as usize;
        let red: Vec<f64> = (0..n)
            .map(|i| 150.0 + pulse_amp_red * (0.25 * i as f64).sin())
            .collect();
        let green: Vec<f64> = (0..n)
            .map(|i| 100.0 + pulse_amp_green * (0.25 * i as f64).sin())
            .collect();
        (red, green)
    }

    #[test]
    fn test_spo2_available_inside_gates() {
        let (red, green) = spo2_fixture(1.5, 2.0);
        // R = (1.5/150)/(2/100) = 0.5 -> spo2 = 110 - 12.5 = 97.5
        let spo2 = estimate_spo2(&red, &green, 30.0, Some(72.0)).unwrap();
        assert!((spo2 - 97.5).abs() < 0.5, "spo2 {spo2}");
    }

    #[test]
    fn test_spo2_unavailable_without_heart_rate() {
        let (red, green) = spo2_fixture(1.5, 2.0);
        assert!(estimate_spo2(&red, &green, 30.0, None).is_none());
        assert!(estimate_spo2(&red, &green, 30.0, Some(30.0)).is_none());
        assert!(estimate_spo2(&red, &green, 30.0, Some(200.0)).is_none());
    }

    #[test]
    fn test_spo2_unavailable_when_too_short() {
        let (red, green) = spo2_fixture(1.5, 2.0);
        let short_red = &red[..60];
        let short_green = &green[..60];
        assert!(estimate_spo2(short_red, short_green, 30.0, Some(72.0)).is_none());
    }

    #[test]
    fn test_spo2_unavailable_for_implausible_ratio() {
        // Red pulsation vastly stronger than green pushes R above the window
        let (red, green) = spo2_fixture(30.0, 1.0);
        assert!(estimate_spo2(&red, &green, 30.0, Some(72.0)).is_none());
    }

    #[test]
    fn test_assemble_vitals_gates_independently() {
        let vitals = assemble_vitals(
            72.0,
            HeartRateConfidence::High,
            None,
            None,
            Some(97.0),
            0.9,
            0.4,
        );
        assert!(vitals.hrv_sdnn_ms.is_none());
        assert!(vitals.stress_index.is_none());
        assert_eq!(vitals.spo2_pct, Some(97.0));
        assert!(!vitals.disclaimer.is_empty());
        assert_eq!(vitals.confidence_percent, 85);
    }
}
