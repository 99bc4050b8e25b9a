//! Per-frame channel sampling across a clip.
//!
//! Walks frames in capture order, invokes the ROI tracker once per frame, and
//! records mean channel intensities per region into pre-sized buffers so that
//! index `i` always corresponds to capture order `i`. Frames without a valid
//! region contribute a NaN marker to every series of that region.

use crate::constants::DEFAULT_MIN_DETECTION_RATIO;
use crate::face_detection::RoiTracker;
use crate::frame::{RegionKind, VideoClip};
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Raw mean-intensity series for one region, one entry per processed frame
#[derive(Debug, Clone)]
pub struct RegionSeries {
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
}

impl RegionSeries {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            red: Vec::with_capacity(capacity),
            green: Vec::with_capacity(capacity),
            blue: Vec::with_capacity(capacity),
        }
    }

    fn push_missing(&mut self) {
        self.red.push(f64::NAN);
        self.green.push(f64::NAN);
        self.blue.push(f64::NAN);
    }

    /// Fraction of frames where this region was sampled
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.green.is_empty() {
            return 0.0;
        }
        self.green.iter().filter(|v| v.is_finite()).count() as f64 / self.green.len() as f64
    }
}

/// All per-region series extracted from one clip
#[derive(Debug, Clone)]
pub struct ExtractedSignals {
    series: [RegionSeries; 3],
    /// Sampling rate in Hz (clip frame rate after clamping)
    pub sample_rate: f64,
    /// Frames with a detected face
    pub detected_frames: usize,
    /// Frames processed in total
    pub total_frames: usize,
}

impl ExtractedSignals {
    /// Series for one region
    #[must_use]
    pub fn region(&self, kind: RegionKind) -> &RegionSeries {
        match kind {
            RegionKind::Forehead => &self.series[0],
            RegionKind::LeftCheek => &self.series[1],
            RegionKind::RightCheek => &self.series[2],
        }
    }

    /// Fraction of frames with a detected face
    #[must_use]
    pub fn detection_ratio(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.detected_frames as f64 / self.total_frames as f64
    }
}

/// Progress and cancellation hooks for one extraction run.
///
/// The progress callback is fire-and-forget: the pipeline never waits on it
/// and ignores anything it does. The cancellation flag is advisory and
/// checked between frames; on cancellation the partial buffers are dropped,
/// never published.
#[derive(Default)]
pub struct ExtractionOptions<'a> {
    /// Invoked as `(frames_done, frames_total)` after each processed frame
    pub progress: Option<&'a dyn Fn(usize, usize)>,
    /// Advisory cancellation flag
    pub cancel: Option<&'a AtomicBool>,
}

/// Frame-ordered signal extractor
pub struct SignalExtractor {
    tracker: RoiTracker,
    min_detection_ratio: f64,
}

impl SignalExtractor {
    /// Create an extractor with the default detection-ratio policy
    #[must_use]
    pub fn new(tracker: RoiTracker) -> Self {
        Self::with_min_detection_ratio(tracker, DEFAULT_MIN_DETECTION_RATIO)
    }

    /// Create an extractor with a custom minimum detection ratio
    #[must_use]
    pub fn with_min_detection_ratio(tracker: RoiTracker, min_detection_ratio: f64) -> Self {
        Self {
            tracker,
            min_detection_ratio,
        }
    }

    /// Sample every frame of the clip into per-region channel series.
    ///
    /// # Errors
    ///
    /// - [`Error::InputUnreadable`] for an empty clip
    /// - [`Error::Cancelled`] when the advisory flag was raised
    /// - [`Error::LowDetectionRate`] when the face was visible in too few
    ///   frames; producing vitals from mostly-absent signal is disallowed
    pub fn extract(
        &self,
        clip: &VideoClip,
        options: &ExtractionOptions<'_>,
    ) -> Result<ExtractedSignals> {
        let total = clip.len();
        if total == 0 {
            return Err(Error::InputUnreadable("clip holds no frames".to_string()));
        }

        let mut series = [
            RegionSeries::with_capacity(total),
            RegionSeries::with_capacity(total),
            RegionSeries::with_capacity(total),
        ];
        let mut detected = 0usize;

        for (index, frame) in clip.frames.iter().enumerate() {
            if let Some(flag) = options.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(Error::Cancelled);
                }
            }

            let regions = self.tracker.track(frame);
            if regions.is_some() {
                detected += 1;
            }

            for (slot, kind) in series.iter_mut().zip(RegionKind::ALL) {
                match regions.as_ref().and_then(|r| r.get(kind)) {
                    Some(roi) => {
                        let means = frame.mean_channels(&roi);
                        slot.red.push(means.red);
                        slot.green.push(means.green);
                        slot.blue.push(means.blue);
                    }
                    None => slot.push_missing(),
                }
            }

            if let Some(progress) = options.progress {
                progress(index + 1, total);
            }
        }

        let ratio = detected as f64 / total as f64;
        log::debug!(
            "processed {total} frames, face detected in {detected} ({:.1}%)",
            100.0 * ratio
        );

        if ratio < self.min_detection_ratio {
            return Err(Error::LowDetectionRate {
                detected,
                total,
            });
        }

        Ok(ExtractedSignals {
            series,
            sample_rate: clip.fps(),
            detected_frames: detected,
            total_frames: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_detection::DetectorStrategy;
    use crate::frame::{Frame, RoiBox, VideoClip};
    use std::cell::Cell;

    fn skin_frame(width: u32, height: u32) -> Frame {
        let mut data = vec![0u8; width as usize * height as usize * 3];
        let face = RoiBox::new(width / 4, height / 8, width / 2, 3 * height / 4);
        for y in face.y..face.y + face.h {
            for x in face.x..face.x + face.w {
                let i = (y as usize * width as usize + x as usize) * 3;
                data[i] = 200;
                data[i + 1] = 140;
                data[i + 2] = 110;
            }
        }
        Frame::from_rgb8(width, height, data).unwrap()
    }

    fn dark_frame(width: u32, height: u32) -> Frame {
        Frame::from_rgb8(width, height, vec![5u8; width as usize * height as usize * 3]).unwrap()
    }

    fn extractor() -> SignalExtractor {
        SignalExtractor::new(RoiTracker::new(DetectorStrategy::with_fallback()))
    }

    #[test]
    fn test_series_length_equals_frame_count() {
        let frames: Vec<Frame> = (0..20).map(|_| skin_frame(160, 120)).collect();
        let clip = VideoClip::new(frames, 30.0);
        let signals = extractor().extract(&clip, &ExtractionOptions::default()).unwrap();
        for kind in RegionKind::ALL {
            assert_eq!(signals.region(kind).green.len(), 20);
        }
        assert_eq!(signals.detected_frames, 20);
    }

    #[test]
    fn test_empty_clip_is_unreadable() {
        let clip = VideoClip::new(vec![], 30.0);
        assert!(matches!(
            extractor().extract(&clip, &ExtractionOptions::default()),
            Err(Error::InputUnreadable(_))
        ));
    }

    #[test]
    fn test_progress_callback_fires_per_frame() {
        let frames: Vec<Frame> = (0..5).map(|_| skin_frame(160, 120)).collect();
        let clip = VideoClip::new(frames, 30.0);
        let calls = Cell::new(0usize);
        let progress = |done: usize, total: usize| {
            calls.set(calls.get() + 1);
            assert!(done <= total);
        };
        let options = ExtractionOptions {
            progress: Some(&progress),
            cancel: None,
        };
        extractor().extract(&clip, &options).unwrap();
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_cancellation_discards_output() {
        let frames: Vec<Frame> = (0..5).map(|_| skin_frame(160, 120)).collect();
        let clip = VideoClip::new(frames, 30.0);
        let flag = AtomicBool::new(true);
        let options = ExtractionOptions {
            progress: None,
            cancel: Some(&flag),
        };
        assert!(matches!(
            extractor().extract(&clip, &options),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn test_low_detection_rate_fails() {
        // Face visible in 1 of 20 frames: 5% is below the policy floor
        let mut frames: Vec<Frame> = (0..19).map(|_| dark_frame(160, 120)).collect();
        frames.insert(7, skin_frame(160, 120));
        let clip = VideoClip::new(frames, 30.0);
        match extractor().extract(&clip, &ExtractionOptions::default()) {
            Err(Error::LowDetectionRate { detected, total }) => {
                assert_eq!(detected, 1);
                assert_eq!(total, 20);
            }
            other => panic!("expected LowDetectionRate, got {other:?}"),
        }
    }
}
