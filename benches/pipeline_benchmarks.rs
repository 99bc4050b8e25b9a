//! Benchmarks for the vitals pipeline stages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rppg_vitals::conditioning::SignalConditioner;
use rppg_vitals::config::Config;
use rppg_vitals::frame::{Frame, RoiBox, VideoClip};
use rppg_vitals::pipeline::{ProcessOptions, VitalsPipeline};
use rppg_vitals::spectrum::welch_psd;

fn pulse_frame(width: u32, height: u32, pulse: f64) -> Frame {
    let mut data = vec![0u8; width as usize * height as usize * 3];
    let face = RoiBox::new(width / 4, height / 8, width / 2, 3 * height / 4);
    let green = (140.0 + 3.0 * pulse).round() as u8;
    for y in face.y..face.y + face.h {
        for x in face.x..face.x + face.w {
            let i = (y as usize * width as usize + x as usize) * 3;
            data[i] = 200;
            data[i + 1] = green;
            data[i + 2] = 110;
        }
    }
    Frame::from_rgb8(width, height, data).expect("buffer sized for dimensions")
}

fn pulse_clip(width: u32, height: u32, fps: f64, seconds: f64) -> VideoClip {
    let n = (fps * seconds) as usize;
    let frames = (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * 1.2 * i as f64 / fps;
            pulse_frame(width, height, phase.sin())
        })
        .collect();
    VideoClip::new(frames, fps)
}

fn pulse_series(fps: f64, seconds: f64) -> Vec<f64> {
    let n = (fps * seconds) as usize;
    (0..n)
        .map(|i| 140.0 + 3.0 * (2.0 * std::f64::consts::PI * 1.2 * i as f64 / fps).sin())
        .collect()
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let pipeline = VitalsPipeline::from_config(Config::default()).expect("valid config");
    for (name, width, height) in [("qqvga", 160u32, 120u32), ("vga", 640, 480)] {
        let clip = pulse_clip(width, height, 30.0, 10.0);
        group.bench_with_input(BenchmarkId::new("process_10s", name), &clip, |b, clip| {
            b.iter(|| {
                black_box(
                    pipeline
                        .process(black_box(clip), &ProcessOptions::default())
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn benchmark_signal_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_stages");

    let conditioner = SignalConditioner::new(30.0, 0.7, 4.0).expect("valid band");
    for seconds in [10.0, 30.0, 60.0] {
        let series = pulse_series(30.0, seconds);
        group.bench_with_input(
            BenchmarkId::new("condition", seconds as u32),
            &series,
            |b, series| {
                b.iter(|| black_box(conditioner.condition(black_box(series)).unwrap()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("welch_psd", seconds as u32),
            &series,
            |b, series| {
                b.iter(|| black_box(welch_psd(black_box(series), 30.0)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_full_pipeline, benchmark_signal_stages);
criterion_main!(benches);
