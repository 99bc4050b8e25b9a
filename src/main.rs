//! Command-line vitals estimation from a directory of video frames.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rppg_vitals::config::Config;
use rppg_vitals::frame::VideoClip;
use rppg_vitals::pipeline::{ProcessOptions, VitalsPipeline};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of numbered frame images (png/jpg), sorted by filename
    frames: String,

    /// Frame rate the clip was captured at
    #[arg(short = 'r', long, default_value = "30.0")]
    fps: f64,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Emit the full result as JSON instead of a text summary
    #[arg(short, long)]
    json: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        Config::from_file(config_path)
            .with_context(|| format!("failed to load config {config_path}"))?
    } else {
        Config::default()
    };

    let clip = VideoClip::from_image_dir(&args.frames, args.fps)
        .with_context(|| format!("failed to load frames from {}", args.frames))?;
    info!("loaded {} frames at {:.1} fps", clip.len(), clip.fps());

    let pipeline = VitalsPipeline::from_config(config)?;
    let progress = |done: usize, total: usize| {
        if done % 100 == 0 || done == total {
            info!("processed {done}/{total} frames");
        }
    };
    let options = ProcessOptions {
        progress: Some(&progress),
        cancel: None,
    };
    let output = pipeline.process(&clip, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let vitals = &output.vitals;
    println!(
        "Heart rate:     {:.1} BPM ({:?} confidence)",
        vitals.heart_rate_bpm, vitals.heart_rate_confidence
    );
    match (vitals.hrv_sdnn_ms, vitals.hrv_rmssd_ms, vitals.hrv_pnn50_pct) {
        (Some(sdnn), Some(rmssd), Some(pnn50)) => {
            println!("HRV:            SDNN {sdnn:.1} ms, RMSSD {rmssd:.1} ms, pNN50 {pnn50:.1}%");
        }
        _ => println!("HRV:            unavailable (too few beats detected)"),
    }
    match vitals.stress_index {
        Some(stress) => println!("Stress index:   {stress:.1}/10"),
        None => println!("Stress index:   unavailable"),
    }
    match (vitals.bp_systolic, vitals.bp_diastolic) {
        (Some(sys), Some(dia)) => println!("Blood pressure: {sys:.0}/{dia:.0} mmHg"),
        _ => println!("Blood pressure: unavailable"),
    }
    match vitals.spo2_pct {
        Some(spo2) => println!("SpO2:           {spo2:.0}%"),
        None => println!("SpO2:           unavailable"),
    }
    println!(
        "Quality:        {:.1}/10, confidence {}%, face in {:.0}% of frames",
        vitals.signal_quality_score,
        vitals.confidence_percent,
        100.0 * vitals.detection_ratio
    );

    if let Some(risk) = &output.risk {
        println!();
        println!("Risk level:     {:?} ({} points)", risk.level, risk.score);
        for alert in &risk.alerts {
            println!("  - {alert}");
        }
        println!("{}", risk.recommendation);
        println!();
        println!("{}", risk.advisory);
    }
    println!();
    println!("{}", vitals.disclaimer);

    Ok(())
}
