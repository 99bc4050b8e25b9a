//! Failure-path tests for the pipeline and clip loading


use rppg_vitals::config::Config;
use rppg_vitals::frame::VideoClip;
use rppg_vitals::pipeline::{ProcessOptions, VitalsPipeline};
use rppg_vitals::Error;
use std::sync::atomic::AtomicBool;
use test_helpers::{dark_frame, pulse_clip, skin_frame, static_clip};

fn default_pipeline() -> VitalsPipeline {
    VitalsPipeline::from_config(Config::default()).expect("default config is valid")
}

#[test]
fn test_empty_clip_is_unreadable() {
    let clip = VideoClip::new(vec![], 30.0);
    assert!(matches!(
        default_pipeline().process(&clip, &ProcessOptions::default()),
        Err(Error::InputUnreadable(_))
    ));
}

#[test]
fn test_mostly_absent_face_fails_loudly() {
    // Face visible in 1 of 20 frames; no vitals are produced from that
    let mut frames: Vec<_> = (0..19).map(|_| dark_frame()).collect();
    frames.insert(10, skin_frame(0.0));
    let clip = VideoClip::new(frames, 30.0);

    match default_pipeline().process(&clip, &ProcessOptions::default()) {
        Err(Error::LowDetectionRate { detected, total }) => {
            assert_eq!(detected, 1);
            assert_eq!(total, 20);
        }
        other => panic!("expected LowDetectionRate, got {other:?}"),
    }
}

#[test]
fn test_static_clip_is_degenerate() {
    // A face is found in every frame but the signal never varies
    let clip = static_clip(30.0, 10.0);
    assert!(matches!(
        default_pipeline().process(&clip, &ProcessOptions::default()),
        Err(Error::DegenerateSignal { .. })
    ));
}

#[test]
fn test_cancellation_aborts_processing() {
    let clip = pulse_clip(72.0, 30.0, 5.0);
    let flag = AtomicBool::new(true);
    let options = ProcessOptions {
        progress: None,
        cancel: Some(&flag),
    };
    assert!(matches!(
        default_pipeline().process(&clip, &options),
        Err(Error::Cancelled)
    ));
}

#[test]
fn test_frame_dir_without_images_is_unreadable() {
    let dir = std::env::temp_dir().join("rppg-vitals-empty-frames-test");
    std::fs::create_dir_all(&dir).unwrap();
    assert!(matches!(
        VideoClip::from_image_dir(&dir, 30.0),
        Err(Error::InputUnreadable(_))
    ));
}

#[test]
fn test_missing_frame_dir_is_io_error() {
    let dir = std::env::temp_dir().join("rppg-vitals-no-such-dir");
    assert!(matches!(
        VideoClip::from_image_dir(&dir, 30.0),
        Err(Error::Io(_))
    ));
}
