//! End-to-end pipeline: frames in, vitals and risk out.
//!
//! Orchestrates extraction, per-region conditioning, quality-weighted fusion,
//! spectral heart-rate estimation, beat intervals, HRV, derived vitals, and
//! risk scoring. A region whose signal degenerates is dropped from fusion
//! with a log line; the run only fails when no region survives.

use crate::conditioning::{fill_gaps, ConditionedSignal, SignalConditioner};
use crate::config::{Config, PulseMethod};
use crate::extraction::{ExtractionOptions, SignalExtractor};
use crate::face_detection::RoiTracker;
use crate::frame::{RegionKind, VideoClip};
use crate::fusion::{fuse_series, fusion_weights, peak_quality};
use crate::heart_rate::estimate_heart_rate;
use crate::hrv::compute_hrv;
use crate::risk::{assess_risk, RiskResult};
use crate::spectrum::welch_psd;
use crate::vitals::{assemble_vitals, estimate_blood_pressure, estimate_spo2, VitalsResult};
use crate::{beats, Error, Result};
use serde::{Deserialize, Serialize};

/// Progress and cancellation hooks for one pipeline run
pub type ProcessOptions<'a> = ExtractionOptions<'a>;

/// Complete output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Derived vitals record
    pub vitals: VitalsResult,
    /// Risk assessment, absent when disabled in configuration
    pub risk: Option<RiskResult>,
}

/// Configured vitals pipeline.
///
/// The detector strategy and all thresholds are fixed at construction; one
/// pipeline can process any number of clips.
pub struct VitalsPipeline {
    config: Config,
    extractor: SignalExtractor,
}

impl VitalsPipeline {
    /// Build a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration fails validation.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let strategy = config.create_detector_strategy()?;
        let extractor = SignalExtractor::with_min_detection_ratio(
            RoiTracker::new(strategy),
            config.detection.min_detection_ratio,
        );
        Ok(Self { config, extractor })
    }

    /// Process one clip into vitals and risk.
    ///
    /// # Errors
    ///
    /// Propagates extraction errors ([`Error::InputUnreadable`],
    /// [`Error::LowDetectionRate`], [`Error::Cancelled`]) and signal errors
    /// ([`Error::DegenerateSignal`], [`Error::ImplausibleHeartRate`],
    /// [`Error::FilterConfiguration`]).
    pub fn process(
        &self,
        clip: &VideoClip,
        options: &ProcessOptions<'_>,
    ) -> Result<PipelineOutput> {
        let signals = self.extractor.extract(clip, options)?;
        let fs = signals.sample_rate;
        let low = self.config.signal.band_low_hz;
        let high = self.config.signal.band_high_hz;
        let conditioner = SignalConditioner::new(fs, low, high)?;

        // Condition each region's pulse series; drop regions that degenerate
        let mut kept: Vec<(RegionKind, ConditionedSignal)> = Vec::new();
        let mut last_error = None;
        for kind in RegionKind::ALL {
            let series = signals.region(kind);
            let pulse = pulse_series(&series.red, &series.green, self.config.pulse.method);
            match conditioner.condition(&pulse) {
                Ok(conditioned) => kept.push((kind, conditioned)),
                Err(err) => {
                    log::debug!("dropping region {}: {err}", kind.name());
                    last_error = Some(err);
                }
            }
        }
        if kept.is_empty() {
            return Err(last_error.unwrap_or(Error::DegenerateSignal {
                stage: "conditioning",
            }));
        }

        let qualities: Vec<f64> = kept
            .iter()
            .map(|(_, signal)| peak_quality(signal, low, high))
            .collect();
        let weights = fusion_weights(&qualities);
        for ((kind, signal), weight) in kept.iter().zip(weights.iter()) {
            log::debug!(
                "region {}: snr {:.2}, weight {:.3}, flags {:?}",
                kind.name(),
                signal.snr,
                weight,
                signal.flags
            );
        }

        let samples: Vec<&[f64]> = kept
            .iter()
            .map(|(_, signal)| signal.samples.as_slice())
            .collect();
        let fused = fuse_series(&samples, &weights);

        // Estimate from the pre-filter fusion: the band-passed trace carries
        // no out-of-band power left to score confidence against
        let prefilter: Vec<&[f64]> = kept
            .iter()
            .map(|(_, signal)| signal.normalized.as_slice())
            .collect();
        let spectrum = welch_psd(&fuse_series(&prefilter, &weights), fs);
        let estimate = estimate_heart_rate(&spectrum, low, high)?;
        log::info!(
            "heart rate {:.1} BPM ({:?}, snr {:.2})",
            estimate.bpm,
            estimate.confidence,
            estimate.snr
        );

        let intervals = beats::detect_beat_intervals(&fused, fs, estimate.bpm);
        let hrv = compute_hrv(&intervals);
        if hrv.is_none() {
            log::debug!(
                "HRV unavailable: {} usable intervals from {} peaks",
                intervals.len(),
                intervals.peak_count
            );
        }

        let blood_pressure = hrv.map(|m| estimate_blood_pressure(estimate.bpm, m.sdnn_ms));

        let spo2 = self
            .fused_raw_channels(&signals, &kept, &weights)
            .and_then(|(red, green)| estimate_spo2(&red, &green, fs, Some(estimate.bpm)));

        let vitals = assemble_vitals(
            estimate.bpm,
            estimate.confidence,
            hrv,
            blood_pressure,
            spo2,
            signals.detection_ratio(),
            estimate.peak_ratio,
        );

        let risk = self
            .config
            .risk
            .enabled
            .then(|| assess_risk(&vitals, self.config.risk.age_years));

        Ok(PipelineOutput { vitals, risk })
    }

    /// Gap-filled raw red and green series fused with the pulse weights,
    /// for the ratio-of-ratios SpO2 estimator. `None` when any kept region
    /// has a channel with no finite sample.
    fn fused_raw_channels(
        &self,
        signals: &crate::extraction::ExtractedSignals,
        kept: &[(RegionKind, ConditionedSignal)],
        weights: &[f64],
    ) -> Option<(Vec<f64>, Vec<f64>)> {
        let mut reds = Vec::with_capacity(kept.len());
        let mut greens = Vec::with_capacity(kept.len());
        for (kind, _) in kept {
            let series = signals.region(*kind);
            reds.push(fill_gaps(&series.red)?);
            greens.push(fill_gaps(&series.green)?);
        }
        let red_slices: Vec<&[f64]> = reds.iter().map(Vec::as_slice).collect();
        let green_slices: Vec<&[f64]> = greens.iter().map(Vec::as_slice).collect();
        Some((
            fuse_series(&red_slices, weights),
            fuse_series(&green_slices, weights),
        ))
    }
}

/// Pulse-signal source from the raw channel means
fn pulse_series(red: &[f64], green: &[f64], method: PulseMethod) -> Vec<f64> {
    match method {
        PulseMethod::Green => green.to_vec(),
        PulseMethod::Chrom => green
            .iter()
            .zip(red.iter())
            .map(|(&g, &r)| 3.0 * g - 2.0 * r)
            .collect(),
    }
}
