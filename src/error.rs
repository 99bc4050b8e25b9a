//! Error types for the rPPG vitals library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Clip could not be decoded into frames
    #[error("input unreadable: {0}")]
    InputUnreadable(String),

    /// Face visible in too few frames to produce a trustworthy signal
    #[error(
        "face detected in only {detected}/{total} frames ({:.1}%); \
         try better lighting or adjust camera position",
        100.0 * *detected as f64 / (*total).max(1) as f64
    )]
    LowDetectionRate {
        /// Frames with a valid face detection
        detected: usize,
        /// Frames processed in total
        total: usize,
    },

    /// Signal variance collapsed to zero after conditioning
    #[error("degenerate signal: variance is numerically zero after {stage}")]
    DegenerateSignal {
        /// Conditioning stage that observed the collapse
        stage: &'static str,
    },

    /// Spectral heart-rate estimate fell outside the sanity window
    #[error("implausible heart rate: {bpm:.1} BPM outside [{min:.0}, {max:.0}]")]
    ImplausibleHeartRate {
        /// Estimated value in beats per minute
        bpm: f64,
        /// Lower sanity bound
        min: f64,
        /// Upper sanity bound
        max: f64,
    },

    /// Band-pass edges are invalid for the sampling rate (misconfiguration)
    #[error("filter configuration error: {0}")]
    FilterConfiguration(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(String),

    /// Image decoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Processing was cancelled by the caller
    #[error("processing cancelled")]
    Cancelled,
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_detection_rate_message() {
        let err = Error::LowDetectionRate {
            detected: 1,
            total: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("1/20"));
        assert!(msg.contains("5.0%"));
    }

    #[test]
    fn test_implausible_heart_rate_message() {
        let err = Error::ImplausibleHeartRate {
            bpm: 260.0,
            min: 30.0,
            max: 220.0,
        };
        assert!(err.to_string().contains("260.0"));
    }
}
