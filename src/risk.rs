//! Heuristic risk scoring over the derived vitals.
//!
//! Additive point scorer: each triggered condition adds points and a
//! human-readable alert. Unavailable inputs contribute nothing, so the score
//! is monotone in the number of triggered conditions. The output always
//! carries a fixed advisory note.

use crate::constants::{
    RISK_ADVISORY_NOTE, RISK_BP_DIA_HIGH, RISK_BP_POINTS, RISK_BP_SYS_HIGH, RISK_BP_SYS_LOW,
    RISK_HIGH_SCORE, RISK_HR_ELEVATED_BPM, RISK_HR_ELEVATED_POINTS, RISK_HR_LOW_BPM,
    RISK_HR_LOW_POINTS, RISK_HR_SEVERE_TACHY_BPM, RISK_HR_SEVERE_TACHY_POINTS, RISK_HR_TACHY_BPM,
    RISK_HR_TACHY_POINTS, RISK_LOW_HRV_POINTS, RISK_LOW_SDNN_MS, RISK_MODERATE_SCORE,
    RISK_SPO2_LOW_PCT, RISK_SPO2_POINTS, RISK_STRESS_HIGH, RISK_STRESS_POINTS,
};
use crate::vitals::VitalsResult;
use serde::{Deserialize, Serialize};

/// Coarse risk bucket derived from the additive score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Risk assessment output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Additive point score
    pub score: u32,
    /// Bucketed level
    pub level: RiskLevel,
    /// One entry per triggered condition, in evaluation order
    pub alerts: Vec<String>,
    /// Plain-language summary matched to the level
    pub recommendation: String,
    /// Fixed advisory note
    pub advisory: String,
}

/// Score the vitals record.
///
/// `age_years` is accepted for API stability but not yet weighted into the
/// score.
#[must_use]
pub fn assess_risk(vitals: &VitalsResult, age_years: Option<u32>) -> RiskResult {
    let _ = age_years;
    let mut score = 0u32;
    let mut alerts = Vec::new();

    let hr = vitals.heart_rate_bpm;
    if hr > RISK_HR_SEVERE_TACHY_BPM {
        score += RISK_HR_SEVERE_TACHY_POINTS;
        alerts.push(format!("Severe tachycardia: {hr:.0} BPM"));
    } else if hr > RISK_HR_TACHY_BPM {
        score += RISK_HR_TACHY_POINTS;
        alerts.push(format!("Tachycardia: {hr:.0} BPM"));
    } else if hr > RISK_HR_ELEVATED_BPM {
        score += RISK_HR_ELEVATED_POINTS;
        alerts.push(format!("Elevated heart rate: {hr:.0} BPM"));
    } else if hr < RISK_HR_LOW_BPM {
        score += RISK_HR_LOW_POINTS;
        alerts.push(format!("Low heart rate: {hr:.0} BPM"));
    }

    if let Some(sdnn) = vitals.hrv_sdnn_ms {
        if sdnn < RISK_LOW_SDNN_MS {
            score += RISK_LOW_HRV_POINTS;
            alerts.push(format!("Low heart-rate variability: SDNN {sdnn:.0} ms"));
        }
    }

    if let (Some(sys), Some(dia)) = (vitals.bp_systolic, vitals.bp_diastolic) {
        if sys > RISK_BP_SYS_HIGH || dia > RISK_BP_DIA_HIGH {
            score += RISK_BP_POINTS;
            alerts.push(format!("Elevated blood pressure: {sys:.0}/{dia:.0} mmHg"));
        } else if sys < RISK_BP_SYS_LOW {
            score += RISK_BP_POINTS;
            alerts.push(format!("Low blood pressure: {sys:.0}/{dia:.0} mmHg"));
        }
    }

    if let Some(spo2) = vitals.spo2_pct {
        if spo2 < RISK_SPO2_LOW_PCT {
            score += RISK_SPO2_POINTS;
            alerts.push(format!("Low oxygen saturation: {spo2:.0}%"));
        }
    }

    if let Some(stress) = vitals.stress_index {
        if stress > RISK_STRESS_HIGH {
            score += RISK_STRESS_POINTS;
            alerts.push(format!("High stress index: {stress:.1}/10"));
        }
    }

    let level = if score >= RISK_HIGH_SCORE {
        RiskLevel::High
    } else if score >= RISK_MODERATE_SCORE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    let recommendation = match level {
        RiskLevel::Low => "Readings look unremarkable. No action suggested.".to_string(),
        RiskLevel::Moderate => {
            "Some readings are outside typical ranges. Consider a repeat \
             measurement under calmer conditions."
                .to_string()
        }
        RiskLevel::High => {
            "Multiple readings are outside typical ranges. Repeat the \
             measurement; if readings persist, consult a healthcare \
             professional."
                .to_string()
        }
    };

    RiskResult {
        score,
        level,
        alerts,
        recommendation,
        advisory: RISK_ADVISORY_NOTE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heart_rate::HeartRateConfidence;

    fn baseline_vitals() -> VitalsResult {
        VitalsResult {
            heart_rate_bpm: 70.0,
            heart_rate_confidence: HeartRateConfidence::High,
            hrv_sdnn_ms: Some(55.0),
            hrv_rmssd_ms: Some(40.0),
            hrv_pnn50_pct: Some(10.0),
            stress_index: Some(2.0),
            bp_systolic: Some(118.0),
            bp_diastolic: Some(78.0),
            spo2_pct: Some(98.0),
            detection_ratio: 0.95,
            confidence_percent: 90,
            signal_quality_score: 7.0,
            disclaimer: String::new(),
        }
    }

    #[test]
    fn test_healthy_vitals_score_low() {
        let risk = assess_risk(&baseline_vitals(), Some(35));
        assert_eq!(risk.score, 0);
        assert_eq!(risk.level, RiskLevel::Low);
        assert!(risk.alerts.is_empty());
        assert!(!risk.advisory.is_empty());
    }

    #[test]
    fn test_heart_rate_tiers_are_graded() {
        let mut v = baseline_vitals();
        v.heart_rate_bpm = 105.0;
        assert_eq!(assess_risk(&v, None).score, RISK_HR_ELEVATED_POINTS);
        v.heart_rate_bpm = 150.0;
        assert_eq!(assess_risk(&v, None).score, RISK_HR_TACHY_POINTS);
        v.heart_rate_bpm = 190.0;
        assert_eq!(assess_risk(&v, None).score, RISK_HR_SEVERE_TACHY_POINTS);
        v.heart_rate_bpm = 45.0;
        assert_eq!(assess_risk(&v, None).score, RISK_HR_LOW_POINTS);
    }

    #[test]
    fn test_unavailable_inputs_add_nothing() {
        let mut v = baseline_vitals();
        v.hrv_sdnn_ms = None;
        v.stress_index = None;
        v.bp_systolic = None;
        v.bp_diastolic = None;
        v.spo2_pct = None;
        let risk = assess_risk(&v, None);
        assert_eq!(risk.score, 0);
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn test_blood_pressure_alerts() {
        let mut v = baseline_vitals();
        v.bp_systolic = Some(150.0);
        v.bp_diastolic = Some(85.0);
        let risk = assess_risk(&v, None);
        assert_eq!(risk.score, RISK_BP_POINTS);
        assert!(risk.alerts[0].starts_with("Elevated blood pressure"));

        v.bp_systolic = Some(92.0);
        v.bp_diastolic = Some(62.0);
        let risk = assess_risk(&v, None);
        assert_eq!(risk.score, RISK_BP_POINTS);
        assert!(risk.alerts[0].starts_with("Low blood pressure"));

        // One missing side means no BP judgment at all
        v.bp_diastolic = None;
        assert_eq!(assess_risk(&v, None).score, 0);
    }

    #[test]
    fn test_score_is_monotone_in_triggered_conditions() {
        let mut v = baseline_vitals();
        let base = assess_risk(&v, None).score;

        v.heart_rate_bpm = 150.0;
        let one = assess_risk(&v, None).score;
        assert!(one > base);

        v.spo2_pct = Some(92.0);
        let two = assess_risk(&v, None).score;
        assert!(two > one);

        v.stress_index = Some(8.5);
        let three = assess_risk(&v, None).score;
        assert!(three > two);
        assert_eq!(assess_risk(&v, None).level, RiskLevel::High);
    }

    #[test]
    fn test_level_buckets() {
        let mut v = baseline_vitals();
        v.heart_rate_bpm = 105.0; // 20 points
        assert_eq!(assess_risk(&v, None).level, RiskLevel::Low);
        v.spo2_pct = Some(92.0); // +15 -> 35
        assert_eq!(assess_risk(&v, None).level, RiskLevel::Moderate);
        v.stress_index = Some(9.0); // +25 -> 60
        assert_eq!(assess_risk(&v, None).level, RiskLevel::High);
        assert_eq!(assess_risk(&v, None).alerts.len(), 3);
    }
}
