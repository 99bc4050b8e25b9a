//! Constants used throughout the pipeline.
//!
//! All policy thresholds live here as named constants so they can be tuned
//! per deployment without hunting for inline magic numbers.

/// Default frames per second assumed when the declared rate is implausible
pub const DEFAULT_FPS: f64 = 30.0;

/// Declared frame rates outside this range are treated as implausible
pub const MIN_PLAUSIBLE_FPS: f64 = 1.0;
pub const MAX_PLAUSIBLE_FPS: f64 = 120.0;

/// Lower edge of the physiological heart-rate band (Hz), 42 BPM
pub const HR_BAND_LOW_HZ: f64 = 0.7;

/// Upper edge of the physiological heart-rate band (Hz), 240 BPM
pub const HR_BAND_HIGH_HZ: f64 = 4.0;

/// Highest usable band edge as a fraction of the sampling rate; a configured
/// upper edge above this is capped rather than rejected
pub const MAX_BAND_EDGE_FS_FRACTION: f64 = 0.45;

/// Sanity window for the spectral heart-rate estimate (BPM)
pub const HR_SANITY_MIN_BPM: f64 = 30.0;
pub const HR_SANITY_MAX_BPM: f64 = 220.0;

/// Minimum fraction of frames with a detected face
pub const DEFAULT_MIN_DETECTION_RATIO: f64 = 0.10;

/// Missing fraction above which the conditioner logs a warning
pub const MAX_MISSING_FRACTION_WARN: f64 = 0.30;

/// Variance below this is treated as numerically zero
pub const DEGENERATE_VARIANCE_EPSILON: f64 = 1e-12;

/// Low-variance quality flag threshold (raw series variance)
pub const LOW_VARIANCE_THRESHOLD: f64 = 1e-6;

/// A first difference larger than this many standard deviations of the
/// signal raises the motion-artifact flag
pub const MOTION_ARTIFACT_SIGMA: f64 = 4.0;

/// SNR thresholds for the heart-rate confidence label
pub const SNR_HIGH_CONFIDENCE: f64 = 2.0;
pub const SNR_MEDIUM_CONFIDENCE: f64 = 1.0;

/// Welch segment length cap (samples)
pub const WELCH_MAX_SEGMENT: usize = 256;

/// Welch segment overlap fraction
pub const WELCH_OVERLAP: f64 = 0.5;

/// Minimum FFT length for Welch segments (zero-padded for finer bins)
pub const WELCH_MIN_NFFT: usize = 1024;

/// Fraction of the expected beat period used as minimum inter-peak distance
pub const PEAK_MIN_DISTANCE_FRACTION: f64 = 0.5;

/// Looser distance fraction used on the single retry
pub const PEAK_RETRY_DISTANCE_FRACTION: f64 = 0.3;

/// Peak amplitude threshold: mean + k * std
pub const PEAK_PROMINENCE_SIGMA: f64 = 0.5;

/// Minimum number of detected peaks for beat intervals
pub const MIN_PEAKS: usize = 3;

/// Physiologically plausible inter-beat interval window (ms)
pub const MIN_IBI_MS: f64 = 300.0;
pub const MAX_IBI_MS: f64 = 2000.0;

/// Minimum number of beat intervals for HRV statistics
pub const MIN_HRV_INTERVALS: usize = 3;

/// pNN50 successive-difference threshold (ms)
pub const PNN50_THRESHOLD_MS: f64 = 50.0;

/// Stress index breakpoints over SDNN (ms), inverse piecewise-linear map
pub const STRESS_SDNN_HIGH_MS: f64 = 25.0;
pub const STRESS_SDNN_MODERATE_MS: f64 = 40.0;
pub const STRESS_SDNN_LOW_MS: f64 = 100.0;
pub const STRESS_INDEX_MIN: f64 = 0.5;
pub const STRESS_INDEX_MAX: f64 = 10.0;

/// Blood-pressure model: baselines and reference points
pub const BP_BASELINE_SYSTOLIC: f64 = 120.0;
pub const BP_BASELINE_DIASTOLIC: f64 = 80.0;
pub const BP_REFERENCE_HR_BPM: f64 = 70.0;
pub const BP_REFERENCE_SDNN_MS: f64 = 50.0;

/// Blood-pressure model: per-unit coefficients (mmHg per BPM / per ms)
pub const BP_SYS_PER_BPM: f64 = 0.5;
pub const BP_DIA_PER_BPM: f64 = 0.3;
pub const BP_SYS_PER_MS_SDNN: f64 = 0.3;
pub const BP_DIA_PER_MS_SDNN: f64 = 0.2;

/// Blood-pressure physiologic clamps (mmHg)
pub const BP_SYS_MIN: f64 = 90.0;
pub const BP_SYS_MAX: f64 = 180.0;
pub const BP_DIA_MIN: f64 = 60.0;
pub const BP_DIA_MAX: f64 = 120.0;

/// Minimum systolic-diastolic gap (mmHg)
pub const BP_MIN_PULSE_PRESSURE: f64 = 20.0;

/// SpO2 gating: minimum signal duration (seconds)
pub const SPO2_MIN_DURATION_SEC: f64 = 5.0;

/// SpO2 gating: heart rate must lie in this range (BPM)
pub const SPO2_HR_MIN_BPM: f64 = 40.0;
pub const SPO2_HR_MAX_BPM: f64 = 180.0;

/// SpO2 gating: accepted ratio-of-ratios window
pub const SPO2_RATIO_MIN: f64 = 0.4;
pub const SPO2_RATIO_MAX: f64 = 1.2;

/// SpO2 linear map: spo2 = SPO2_INTERCEPT - SPO2_SLOPE * R
pub const SPO2_INTERCEPT: f64 = 110.0;
pub const SPO2_SLOPE: f64 = 25.0;

/// SpO2 output clamp (%)
pub const SPO2_MIN_PCT: f64 = 88.0;
pub const SPO2_MAX_PCT: f64 = 100.0;

/// Risk scorer point values
pub const RISK_HR_SEVERE_TACHY_POINTS: u32 = 40;
pub const RISK_HR_TACHY_POINTS: u32 = 30;
pub const RISK_HR_ELEVATED_POINTS: u32 = 20;
pub const RISK_HR_LOW_POINTS: u32 = 30;
pub const RISK_LOW_HRV_POINTS: u32 = 15;
pub const RISK_BP_POINTS: u32 = 20;
pub const RISK_SPO2_POINTS: u32 = 15;
pub const RISK_STRESS_POINTS: u32 = 25;

/// Risk scorer thresholds
pub const RISK_HR_SEVERE_TACHY_BPM: f64 = 180.0;
pub const RISK_HR_TACHY_BPM: f64 = 140.0;
pub const RISK_HR_ELEVATED_BPM: f64 = 100.0;
pub const RISK_HR_LOW_BPM: f64 = 50.0;
pub const RISK_LOW_SDNN_MS: f64 = 20.0;
pub const RISK_BP_SYS_HIGH: f64 = 140.0;
pub const RISK_BP_SYS_LOW: f64 = 95.0;
pub const RISK_BP_DIA_HIGH: f64 = 90.0;
pub const RISK_SPO2_LOW_PCT: f64 = 95.0;
pub const RISK_STRESS_HIGH: f64 = 7.0;

/// Risk level buckets
pub const RISK_HIGH_SCORE: u32 = 50;
pub const RISK_MODERATE_SCORE: u32 = 25;

/// Fixed disclaimer attached to every experimental field
pub const EXPERIMENTAL_DISCLAIMER: &str =
    "Experimental estimate - not clinically validated. Do not use for medical \
     diagnosis or treatment.";

/// Fixed advisory note attached to risk output
pub const RISK_ADVISORY_NOTE: &str =
    "Heuristic advisory only, not a diagnosis. Consult a healthcare \
     professional for medical concerns.";
