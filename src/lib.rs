//! Remote photoplethysmography (rPPG) vitals estimation from facial video.
//!
//! This library turns a sequence of RGB frames into heart rate, heart-rate
//! variability, and a set of explicitly experimental derived vitals by
//! reading the subtle skin-color changes the cardiac cycle produces. The
//! pipeline consists of:
//! 1. Face detection and region-of-interest tracking (forehead and cheeks)
//! 2. Per-frame mean channel sampling into frame-ordered series
//! 3. Signal conditioning: gap filling, detrending, zero-phase band-pass
//! 4. Quality-weighted fusion of the region signals
//! 5. Spectral heart-rate estimation (Welch periodogram)
//! 6. Time-domain beat intervals and HRV statistics
//! 7. Derived vitals (stress, blood pressure, SpO2) and risk scoring
//!
//! # Examples
//!
//! ```no_run
//! use rppg_vitals::config::Config;
//! use rppg_vitals::frame::VideoClip;
//! use rppg_vitals::pipeline::{ProcessOptions, VitalsPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clip = VideoClip::from_image_dir("frames/", 30.0)?;
//! let pipeline = VitalsPipeline::from_config(Config::default())?;
//! let output = pipeline.process(&clip, &ProcessOptions::default())?;
//!
//! println!(
//!     "{:.1} BPM ({:?})",
//!     output.vitals.heart_rate_bpm, output.vitals.heart_rate_confidence
//! );
//! if let Some(sdnn) = output.vitals.hrv_sdnn_ms {
//!     println!("SDNN: {sdnn:.1} ms");
//! }
//! if let Some(risk) = output.risk {
//!     println!("Risk: {:?} ({} points)", risk.level, risk.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress and cancellation
//!
//! ```no_run
//! use rppg_vitals::config::Config;
//! use rppg_vitals::frame::VideoClip;
//! use rppg_vitals::pipeline::{ProcessOptions, VitalsPipeline};
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clip = VideoClip::from_image_dir("frames/", 30.0)?;
//! let pipeline = VitalsPipeline::from_config(Config::default())?;
//!
//! let cancel = AtomicBool::new(false);
//! let progress = |done: usize, total: usize| {
//!     eprintln!("frame {done}/{total}");
//! };
//! let options = ProcessOptions {
//!     progress: Some(&progress),
//!     cancel: Some(&cancel),
//! };
//! let output = pipeline.process(&clip, &options)?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

/// Frame, region, and clip primitives
pub mod frame;

/// Face detection and region-of-interest tracking
pub mod face_detection;

/// Per-frame channel sampling across a clip
pub mod extraction;

/// Signal conditioning and quality assessment
pub mod conditioning;

/// Welch power spectra and band metrics
pub mod spectrum;

/// Quality-weighted fusion of region signals
pub mod fusion;

/// Spectral heart-rate estimation
pub mod heart_rate;

/// Beat detection and inter-beat intervals
pub mod beats;

/// Heart-rate-variability statistics
pub mod hrv;

/// Derived experimental vitals
pub mod vitals;

/// Heuristic risk scoring
pub mod risk;

/// End-to-end pipeline orchestration
pub mod pipeline;

/// Error types and result handling
pub mod error;

/// Constants used throughout the pipeline
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
