//! Frame, region-of-interest, and clip types.
//!
//! Decoding a container/codec into frames is a collaborator concern: the core
//! receives a clip either as in-memory [`Frame`]s or as a directory of
//! numbered still images (one per frame, decoded with the `image` crate).

use crate::constants::{DEFAULT_FPS, MAX_PLAUSIBLE_FPS, MIN_PLAUSIBLE_FPS};
use crate::{Error, Result};
use std::path::Path;

/// A decoded RGB frame, ordered by capture index.
///
/// Pixel data is tightly packed interleaved RGB8 (`width * height * 3` bytes).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Interleaved RGB8 pixel data
    pub data: Vec<u8>,
}

/// Mean intensity of each color channel over a pixel region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Frame {
    /// Create a frame from interleaved RGB8 data
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::InputUnreadable(format!(
                "frame buffer is {} bytes, expected {} for {}x{} RGB8",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Mean red/green/blue intensity inside a region.
    ///
    /// The caller must pass a box that is valid for this frame; see
    /// [`RoiBox::is_valid_for`].
    #[must_use]
    pub fn mean_channels(&self, roi: &RoiBox) -> ChannelMeans {
        let mut sums = [0.0f64; 3];
        let stride = self.width as usize * 3;
        for row in roi.y..roi.y + roi.h {
            let start = row as usize * stride + roi.x as usize * 3;
            let end = start + roi.w as usize * 3;
            for px in self.data[start..end].chunks_exact(3) {
                sums[0] += f64::from(px[0]);
                sums[1] += f64::from(px[1]);
                sums[2] += f64::from(px[2]);
            }
        }
        let n = f64::from(roi.w) * f64::from(roi.h);
        ChannelMeans {
            red: sums[0] / n,
            green: sums[1] / n,
            blue: sums[2] / n,
        }
    }
}

/// Axis-aligned rectangle relative to a frame.
///
/// Valid iff fully inside the frame and with positive area. Derived fresh
/// each frame from detection, never persisted across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl RoiBox {
    /// Create a box; coordinates are not checked here, see [`Self::is_valid_for`]
    #[must_use]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Positive area and fully inside the given frame dimensions
    #[must_use]
    pub fn is_valid_for(&self, frame_width: u32, frame_height: u32) -> bool {
        self.w > 0
            && self.h > 0
            && self.x.checked_add(self.w).is_some_and(|r| r <= frame_width)
            && self.y.checked_add(self.h).is_some_and(|b| b <= frame_height)
    }

    /// Area in pixels
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Skin regions sampled from a detected face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Upper-third of the face, horizontally centered
    Forehead,
    /// Left third at mid-face height
    LeftCheek,
    /// Right third at mid-face height
    RightCheek,
}

impl RegionKind {
    /// All regions in sampling order
    pub const ALL: [Self; 3] = [Self::Forehead, Self::LeftCheek, Self::RightCheek];

    /// Human-readable name for logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forehead => "forehead",
            Self::LeftCheek => "left_cheek",
            Self::RightCheek => "right_cheek",
        }
    }
}

/// A finite clip of decoded frames plus its declared frame rate
pub struct VideoClip {
    /// Decoded frames in capture order
    pub frames: Vec<Frame>,
    fps: f64,
}

impl VideoClip {
    /// Build a clip from frames and a declared frame rate.
    ///
    /// An implausible declared rate (outside 1-120 Hz) falls back to 30 Hz.
    #[must_use]
    pub fn new(frames: Vec<Frame>, declared_fps: f64) -> Self {
        let fps = if declared_fps.is_finite()
            && declared_fps >= MIN_PLAUSIBLE_FPS
            && declared_fps <= MAX_PLAUSIBLE_FPS
        {
            declared_fps
        } else {
            log::warn!(
                "declared frame rate {declared_fps} Hz is implausible, falling back to {DEFAULT_FPS} Hz"
            );
            DEFAULT_FPS
        };
        Self { frames, fps }
    }

    /// Load a clip from a directory of still images, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputUnreadable`] if the directory holds no decodable
    /// frames, or an [`Error::Image`]/[`Error::Io`] for a frame that exists
    /// but cannot be read.
    pub fn from_image_dir<P: AsRef<Path>>(dir: P, declared_fps: f64) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::InputUnreadable(format!(
                "no frame images found in {}",
                dir.display()
            )));
        }

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let img = image::open(path)?.to_rgb8();
            frames.push(Frame {
                width: img.width(),
                height: img.height(),
                data: img.into_raw(),
            });
        }
        log::debug!("loaded {} frames from {}", frames.len(), dir.display());
        Ok(Self::new(frames, declared_fps))
    }

    /// Sampling rate in Hz (declared rate after clamping)
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Number of frames in the clip
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the clip holds no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
