//! Configuration management for the vitals pipeline

use crate::constants::{
    DEFAULT_MIN_DETECTION_RATIO, HR_BAND_HIGH_HZ, HR_BAND_LOW_HZ, MAX_PLAUSIBLE_FPS,
};
use crate::face_detection::DetectorStrategy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pulse-signal source derived from the RGB channel means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseMethod {
    /// Green channel only
    Green,
    /// Chrominance combination 3G - 2R, more robust to illumination shifts
    Chrom,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Signal conditioning configuration
    pub signal: SignalConfig,

    /// Pulse extraction configuration
    pub pulse: PulseConfig,

    /// Risk assessment configuration
    pub risk: RiskConfig,
}

/// Face detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Detector strategy: "skin_with_fallback" or "center_prior"
    pub strategy: String,

    /// Minimum fraction of frames with a detected face (0.0-1.0)
    pub min_detection_ratio: f64,
}

/// Signal conditioning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Lower band-pass edge in Hz
    pub band_low_hz: f64,

    /// Upper band-pass edge in Hz
    pub band_high_hz: f64,
}

/// Pulse extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Pulse-signal source
    pub method: PulseMethod,
}

/// Risk assessment parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Compute the risk assessment alongside the vitals
    pub enabled: bool,

    /// Subject age in years, reserved for future weighting
    pub age_years: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            signal: SignalConfig::default(),
            pulse: PulseConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strategy: "skin_with_fallback".to_string(),
            min_detection_ratio: DEFAULT_MIN_DETECTION_RATIO,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            band_low_hz: HR_BAND_LOW_HZ,
            band_high_hz: HR_BAND_HIGH_HZ,
        }
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            method: PulseMethod::Green,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            age_years: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create a detector strategy from configuration
    pub fn create_detector_strategy(&self) -> Result<DetectorStrategy> {
        match self.detection.strategy.as_str() {
            "skin_with_fallback" => Ok(DetectorStrategy::with_fallback()),
            "center_prior" => Ok(DetectorStrategy::center_prior_only()),
            name => Err(Error::Config(format!("Unknown detector strategy: {}", name))),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.min_detection_ratio) {
            return Err(Error::Config(
                "Minimum detection ratio must be between 0.0 and 1.0".to_string(),
            ));
        }
        self.create_detector_strategy()?;

        if self.signal.band_low_hz <= 0.0 {
            return Err(Error::Config(
                "Lower band edge must be greater than 0 Hz".to_string(),
            ));
        }
        if self.signal.band_high_hz <= self.signal.band_low_hz {
            return Err(Error::Config(
                "Upper band edge must be greater than the lower edge".to_string(),
            ));
        }
        if self.signal.band_high_hz >= MAX_PLAUSIBLE_FPS / 2.0 {
            return Err(Error::Config(format!(
                "Upper band edge {} Hz exceeds any plausible Nyquist frequency",
                self.signal.band_high_hz
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Vitals Pipeline Configuration

# Face detection parameters
detection:
  strategy: "skin_with_fallback"
  min_detection_ratio: 0.1

# Signal conditioning
signal:
  band_low_hz: 0.7
  band_high_hz: 4.0

# Pulse extraction
pulse:
  method: "green"

# Risk assessment
risk:
  enabled: true
  age_years: null
"#;
