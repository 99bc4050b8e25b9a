//! Face detection and skin-region derivation (ROI tracking).
//!
//! Two detector variants sit behind the [`FaceDetector`] trait: a primary
//! skin-chroma segmentation detector and a simpler geometric fallback. The
//! chain is fixed once at pipeline construction (a [`DetectorStrategy`]), so
//! behavior is deterministic within a run. Detection is a pure function of
//! the frame: absence of a face is `None`, never an error.

use crate::frame::{Frame, RegionKind, RoiBox};

/// Forehead sub-rectangle fractions of the detected face box
const FOREHEAD_TOP: f64 = 0.20;
const FOREHEAD_BOTTOM: f64 = 0.35;
const FOREHEAD_LEFT: f64 = 0.25;
const FOREHEAD_RIGHT: f64 = 0.75;

/// Cheek sub-rectangle fractions of the detected face box
const CHEEK_TOP: f64 = 0.50;
const CHEEK_BOTTOM: f64 = 0.75;
const LEFT_CHEEK_LEFT: f64 = 0.10;
const LEFT_CHEEK_RIGHT: f64 = 0.40;
const RIGHT_CHEEK_LEFT: f64 = 0.60;
const RIGHT_CHEEK_RIGHT: f64 = 0.90;

/// Smallest face box accepted by the primary detector, as a fraction of the
/// shorter frame dimension
const MIN_FACE_FRACTION: f64 = 0.08;

/// Largest face box accepted before the scale heuristic rejects it
const MAX_FACE_FRACTION: f64 = 0.98;

/// Geometric prior used by the fallback detector
const PRIOR_WIDTH_FRACTION: f64 = 0.50;
const PRIOR_HEIGHT_FRACTION: f64 = 0.60;
const PRIOR_TOP_FRACTION: f64 = 0.12;

/// Luminance bounds for the fallback classifier to accept its prior box
const PRIOR_MIN_LUMA: f64 = 30.0;
const PRIOR_MAX_LUMA: f64 = 240.0;

/// Trait for face detectors
pub trait FaceDetector: Send + Sync {
    /// Locate the most plausible face box, or `None` when no face is found
    fn detect(&self, frame: &Frame) -> Option<RoiBox>;

    /// Detector name for logs
    fn name(&self) -> &'static str;
}

/// Primary detector: skin-chroma segmentation.
///
/// Classifies pixels with a classic RGB skin rule on a downsampled grid,
/// groups skin pixels into connected components, and keeps the largest
/// component whose bounding box passes the scale heuristics (tie-break:
/// first found in scan order).
#[derive(Debug, Clone, Default)]
pub struct SkinRegionDetector;

impl SkinRegionDetector {
    /// RGB skin classification rule (Peer et al. style)
    #[inline]
    fn is_skin(r: u8, g: u8, b: u8) -> bool {
        r > 95
            && g > 40
            && b > 20
            && r > g
            && r > b
            && r.abs_diff(g) > 15
            && u16::from(r.max(g).max(b)) - u16::from(r.min(g).min(b)) > 15
    }
}

impl FaceDetector for SkinRegionDetector {
    fn detect(&self, frame: &Frame) -> Option<RoiBox> {
        let (w, h) = (frame.width as usize, frame.height as usize);
        if w == 0 || h == 0 {
            return None;
        }

        // Downsample so the labeling pass stays cheap on large frames
        let step = (w.min(h) / 256).max(1);
        let gw = w.div_ceil(step);
        let gh = h.div_ceil(step);

        let mut mask = vec![false; gw * gh];
        for gy in 0..gh {
            let y = gy * step;
            for gx in 0..gw {
                let x = gx * step;
                let idx = (y * w + x) * 3;
                mask[gy * gw + gx] =
                    Self::is_skin(frame.data[idx], frame.data[idx + 1], frame.data[idx + 2]);
            }
        }

        // Two-pass connected components (4-connectivity) with union-find
        let mut labels = vec![0u32; gw * gh];
        let mut parent: Vec<u32> = vec![0];

        fn find(parent: &mut Vec<u32>, mut x: u32) -> u32 {
            while parent[x as usize] != x {
                parent[x as usize] = parent[parent[x as usize] as usize];
                x = parent[x as usize];
            }
            x
        }

        for gy in 0..gh {
            for gx in 0..gw {
                let i = gy * gw + gx;
                if !mask[i] {
                    continue;
                }
                let left = if gx > 0 && mask[i - 1] { labels[i - 1] } else { 0 };
                let up = if gy > 0 && mask[i - gw] { labels[i - gw] } else { 0 };
                labels[i] = match (left, up) {
                    (0, 0) => {
                        let l = parent.len() as u32;
                        parent.push(l);
                        l
                    }
                    (l, 0) | (0, l) => l,
                    (l, u) => {
                        let (rl, ru) = (find(&mut parent, l), find(&mut parent, u));
                        if rl != ru {
                            let (keep, merge) = (rl.min(ru), rl.max(ru));
                            parent[merge as usize] = keep;
                        }
                        rl.min(ru)
                    }
                };
            }
        }

        // Bounding box and area per root label, in scan order
        struct Component {
            min_x: usize,
            max_x: usize,
            min_y: usize,
            max_y: usize,
            count: u64,
        }
        let mut order: Vec<u32> = Vec::new();
        let mut comps: std::collections::HashMap<u32, Component> = std::collections::HashMap::new();
        for gy in 0..gh {
            for gx in 0..gw {
                let i = gy * gw + gx;
                if labels[i] == 0 {
                    continue;
                }
                let root = find(&mut parent, labels[i]);
                let comp = comps.entry(root).or_insert_with(|| {
                    order.push(root);
                    Component {
                        min_x: gx,
                        max_x: gx,
                        min_y: gy,
                        max_y: gy,
                        count: 0,
                    }
                });
                comp.min_x = comp.min_x.min(gx);
                comp.max_x = comp.max_x.max(gx);
                comp.min_y = comp.min_y.min(gy);
                comp.max_y = comp.max_y.max(gy);
                comp.count += 1;
            }
        }

        // Largest candidate wins; strict > keeps the first found on ties
        let mut best: Option<(u64, RoiBox)> = None;
        let min_side = (MIN_FACE_FRACTION * w.min(h) as f64) as u32;
        let max_side = (MAX_FACE_FRACTION * w.max(h) as f64) as u32;
        for root in order {
            let c = &comps[&root];
            let bx = (c.min_x * step) as u32;
            let by = (c.min_y * step) as u32;
            let bw = (((c.max_x - c.min_x + 1) * step) as u32).min(frame.width - bx);
            let bh = (((c.max_y - c.min_y + 1) * step) as u32).min(frame.height - by);
            let candidate = RoiBox::new(bx, by, bw, bh);

            // Scale heuristics: too small is noise, too large is a wash-out
            if bw < min_side || bh < min_side || bw > max_side || bh > max_side {
                continue;
            }
            if !candidate.is_valid_for(frame.width, frame.height) {
                continue;
            }
            let area = candidate.area();
            if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
                best = Some((area, candidate));
            }
        }

        best.map(|(_, roi)| roi)
    }

    fn name(&self) -> &'static str {
        "skin_region"
    }
}

/// Fallback detector: geometric prior with a plausibility gate.
///
/// Assumes a roughly centered subject and proposes a frame-relative box, but
/// only accepts it when the box looks like lit skin: mean luminance inside a
/// sane range and a warmer-than-blue cast. A near-black or washed-out frame
/// still counts as "no face".
#[derive(Debug, Clone, Default)]
pub struct CenterPriorDetector;

impl FaceDetector for CenterPriorDetector {
    fn detect(&self, frame: &Frame) -> Option<RoiBox> {
        if frame.width < 16 || frame.height < 16 {
            return None;
        }
        let w = (f64::from(frame.width) * PRIOR_WIDTH_FRACTION) as u32;
        let h = (f64::from(frame.height) * PRIOR_HEIGHT_FRACTION) as u32;
        let x = (frame.width - w) / 2;
        let y = (f64::from(frame.height) * PRIOR_TOP_FRACTION) as u32;
        let roi = RoiBox::new(x, y, w, h);
        if !roi.is_valid_for(frame.width, frame.height) {
            return None;
        }

        let means = frame.mean_channels(&roi);
        let luma = 0.299 * means.red + 0.587 * means.green + 0.114 * means.blue;
        if !(PRIOR_MIN_LUMA..=PRIOR_MAX_LUMA).contains(&luma) || means.red < means.blue {
            return None;
        }
        Some(roi)
    }

    fn name(&self) -> &'static str {
        "center_prior"
    }
}

/// Detector chain, fixed once at pipeline construction
pub enum DetectorStrategy {
    /// Skin segmentation first, geometric prior when it reports nothing
    SkinWithFallback(SkinRegionDetector, CenterPriorDetector),
    /// Geometric prior only
    CenterPriorOnly(CenterPriorDetector),
}

impl DetectorStrategy {
    /// Default chain: primary with fallback
    #[must_use]
    pub fn with_fallback() -> Self {
        Self::SkinWithFallback(SkinRegionDetector, CenterPriorDetector)
    }

    /// Geometric prior only, for clips where segmentation is known to fail
    #[must_use]
    pub fn center_prior_only() -> Self {
        Self::CenterPriorOnly(CenterPriorDetector)
    }

    /// Run the chain against one frame
    #[must_use]
    pub fn detect(&self, frame: &Frame) -> Option<RoiBox> {
        match self {
            Self::SkinWithFallback(primary, fallback) => primary
                .detect(frame)
                .or_else(|| fallback.detect(frame)),
            Self::CenterPriorOnly(fallback) => fallback.detect(frame),
        }
    }
}

/// Skin regions derived from one detected face
#[derive(Debug, Clone, Copy)]
pub struct FaceRegions {
    /// The detected face box
    pub face: RoiBox,
    /// Forehead box, if it survived the validity check
    pub forehead: Option<RoiBox>,
    /// Left cheek box
    pub left_cheek: Option<RoiBox>,
    /// Right cheek box
    pub right_cheek: Option<RoiBox>,
}

impl FaceRegions {
    /// Region box by kind
    #[must_use]
    pub fn get(&self, kind: RegionKind) -> Option<RoiBox> {
        match kind {
            RegionKind::Forehead => self.forehead,
            RegionKind::LeftCheek => self.left_cheek,
            RegionKind::RightCheek => self.right_cheek,
        }
    }
}

/// Per-frame ROI tracker: detector chain plus face-to-region geometry
pub struct RoiTracker {
    strategy: DetectorStrategy,
}

impl RoiTracker {
    /// Create a tracker with the given detector chain
    #[must_use]
    pub fn new(strategy: DetectorStrategy) -> Self {
        Self { strategy }
    }

    /// Detect a face and derive its skin regions, or `None` for no face.
    ///
    /// A region whose box falls outside the frame or collapses to zero area
    /// is dropped for that frame; it counts as "no face" for that region.
    #[must_use]
    pub fn track(&self, frame: &Frame) -> Option<FaceRegions> {
        let face = self.strategy.detect(frame)?;
        Some(FaceRegions {
            face,
            forehead: sub_box(
                &face, frame, FOREHEAD_LEFT, FOREHEAD_TOP, FOREHEAD_RIGHT, FOREHEAD_BOTTOM,
            ),
            left_cheek: sub_box(
                &face, frame, LEFT_CHEEK_LEFT, CHEEK_TOP, LEFT_CHEEK_RIGHT, CHEEK_BOTTOM,
            ),
            right_cheek: sub_box(
                &face, frame, RIGHT_CHEEK_LEFT, CHEEK_TOP, RIGHT_CHEEK_RIGHT, CHEEK_BOTTOM,
            ),
        })
    }
}

/// Fractional sub-rectangle of a face box, clipped to the frame
fn sub_box(
    face: &RoiBox,
    frame: &Frame,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
) -> Option<RoiBox> {
    let x1 = face.x + (f64::from(face.w) * left) as u32;
    let y1 = face.y + (f64::from(face.h) * top) as u32;
    let x2 = (face.x + (f64::from(face.w) * right) as u32).min(frame.width);
    let y2 = (face.y + (f64::from(face.h) * bottom) as u32).min(frame.height);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    let roi = RoiBox::new(x1, y1, x2 - x1, y2 - y1);
    roi.is_valid_for(frame.width, frame.height).then_some(roi)
}
