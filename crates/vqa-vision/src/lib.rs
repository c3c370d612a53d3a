//! Screenshot comparison engine: normalisation, differencing, region
//! detection and scoring.

pub mod codec;
pub mod diff;
pub mod normalize;
pub mod region;
pub mod score;

use tracing::debug;
use vqa_types::{
    report::{DiffRegion, MatchClass},
    vision::ImageFrame,
    Result, VqaError,
};

pub use codec::{ImageCodec, RasterCodec};
pub use diff::{pixel_diff, DiffMask, PixelDiff};
pub use normalize::normalize;
pub use region::detect_region;
pub use score::{classify, match_score};

/// Everything the engine derives from one pair of frames. Numbers are
/// rounded to two decimals.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub mean_diff: f64,
    pub max_diff: f64,
    pub diff_percent: f64,
    pub match_score: f64,
    pub class: MatchClass,
    pub resolution: (u32, u32),
    pub region: Option<DiffRegion>,
    pub diff_image: ImageFrame,
}

/// Runs normalize -> diff -> region -> score over decoded frames.
pub struct ScreenComparator<C> {
    codec: C,
}

impl<C: ImageCodec> ScreenComparator<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<ImageFrame> {
        self.codec.decode(bytes)
    }

    pub fn compare(&self, captured: &ImageFrame, reference: &ImageFrame) -> Result<Comparison> {
        let (captured, reference) = normalize(&self.codec, captured, reference)?;
        let diff = pixel_diff(&captured, &reference)?;
        let region = detect_region(&diff.mask, diff.diff_percent);
        let score = match_score(diff.diff_percent);
        debug!(
            "Diff at {}x{}: mean={:.2} max={:.2} differing={}",
            captured.width,
            captured.height,
            diff.mean_diff,
            diff.max_diff,
            diff.mask.count()
        );

        Ok(Comparison {
            mean_diff: diff.rounded_mean(),
            max_diff: diff.rounded_max(),
            diff_percent: diff.rounded_percent(),
            match_score: score,
            class: classify(score),
            resolution: captured.dimensions(),
            region,
            diff_image: diff.diff_image,
        })
    }

    pub fn encode(&self, frame: &ImageFrame) -> Result<Vec<u8>> {
        self.codec.encode(frame)
    }
}

/// Rounds to two decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn vision_error(message: impl Into<String>) -> VqaError {
    VqaError::Vision(message.into())
}
