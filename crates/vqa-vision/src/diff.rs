//! Per-pixel differencing of two equally sized frames.

use vqa_types::{
    vision::{ImageFrame, CHANNELS},
    Result,
};

use crate::{round2, vision_error};

/// Per-pixel mean channel difference above which a pixel counts as differing.
pub const PIXEL_DIFF_THRESHOLD: f64 = 30.0;

/// Amplification applied to channel differences in the diff visualisation.
pub const DIFF_IMAGE_GAIN: f64 = 3.0;

/// Boolean grid marking the pixels whose difference exceeds the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl DiffMask {
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        (bits.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.bits.chunks(self.width.max(1) as usize)
    }
}

/// Raw (unrounded) statistics of a comparison plus its artefacts.
#[derive(Debug, Clone)]
pub struct PixelDiff {
    /// Mean of every per-channel absolute difference, 0-255.
    pub mean_diff: f64,
    /// Largest single per-channel absolute difference.
    pub max_diff: f64,
    /// Share of pixels above [`PIXEL_DIFF_THRESHOLD`], 0-100.
    pub diff_percent: f64,
    pub mask: DiffMask,
    /// Channel differences times [`DIFF_IMAGE_GAIN`], clamped to 255.
    pub diff_image: ImageFrame,
}

impl PixelDiff {
    pub fn rounded_mean(&self) -> f64 {
        round2(self.mean_diff)
    }

    pub fn rounded_max(&self) -> f64 {
        round2(self.max_diff)
    }

    pub fn rounded_percent(&self) -> f64 {
        round2(self.diff_percent)
    }
}

/// Computes difference statistics between two frames of identical size.
pub fn pixel_diff(a: &ImageFrame, b: &ImageFrame) -> Result<PixelDiff> {
    if a.dimensions() != b.dimensions() {
        return Err(vision_error(format!(
            "cannot diff {}x{} against {}x{}; normalize first",
            a.width, a.height, b.width, b.height
        )));
    }
    if a.data.len() != b.data.len() || a.data.len() != a.pixel_count() * CHANNELS {
        return Err(vision_error("frame buffers do not match their dimensions"));
    }

    let pixels = a.pixel_count();
    let mut total = 0.0_f64;
    let mut max_diff = 0.0_f64;
    let mut bits = Vec::with_capacity(pixels);
    let mut amplified = Vec::with_capacity(a.data.len());

    for (pa, pb) in a.data.chunks_exact(CHANNELS).zip(b.data.chunks_exact(CHANNELS)) {
        let mut pixel_total = 0.0_f64;
        for (&ca, &cb) in pa.iter().zip(pb) {
            let delta = (f64::from(ca) - f64::from(cb)).abs();
            pixel_total += delta;
            max_diff = max_diff.max(delta);
            amplified.push((delta * DIFF_IMAGE_GAIN).clamp(0.0, 255.0) as u8);
        }
        total += pixel_total;
        bits.push(pixel_total / CHANNELS as f64 > PIXEL_DIFF_THRESHOLD);
    }

    let differing = bits.iter().filter(|&&bit| bit).count();
    let (mean_diff, diff_percent) = if pixels == 0 {
        (0.0, 0.0)
    } else {
        (
            total / (pixels * CHANNELS) as f64,
            differing as f64 / pixels as f64 * 100.0,
        )
    };

    let mask = DiffMask::from_bits(a.width, a.height, bits)
        .ok_or_else(|| vision_error("difference mask size mismatch"))?;
    let diff_image = ImageFrame::from_rgba(a.width, a.height, amplified)
        .ok_or_else(|| vision_error("diff image size mismatch"))?;

    Ok(PixelDiff {
        mean_diff,
        max_diff,
        diff_percent,
        mask,
        diff_image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_frames_have_no_difference() {
        let frame =
            ImageFrame::filled(8, 8, [12, 34, 56, 255]).with_rect(2, 2, 3, 3, [200, 0, 0, 255]);
        let diff = pixel_diff(&frame, &frame.clone()).expect("diff");
        assert_eq!(diff.mean_diff, 0.0);
        assert_eq!(diff.max_diff, 0.0);
        assert_eq!(diff.diff_percent, 0.0);
        assert_eq!(diff.mask.count(), 0);
        assert!(diff.diff_image.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn statistics_follow_channel_differences() {
        // 2x1 frames: the first pixel differs by 40 on R and G, the second is equal.
        let a = ImageFrame::from_rgba(2, 1, vec![100, 100, 0, 255, 7, 7, 7, 255]).expect("a");
        let b = ImageFrame::from_rgba(2, 1, vec![140, 60, 0, 255, 7, 7, 7, 255]).expect("b");
        let diff = pixel_diff(&a, &b).expect("diff");
        assert_eq!(diff.max_diff, 40.0);
        assert_eq!(diff.mean_diff, 80.0 / 8.0);
        // Per-pixel mean is 20, below the threshold.
        assert_eq!(diff.diff_percent, 0.0);
        assert_eq!(diff.diff_image.pixel(0, 0), Some([120, 120, 0, 0]));
    }

    #[test]
    fn threshold_is_strict_and_gain_clamps() {
        // Mean channel difference exactly 30 does not count, 31 does.
        let a = ImageFrame::from_rgba(2, 1, vec![0, 0, 0, 0, 0, 0, 0, 0]).expect("a");
        let b = ImageFrame::from_rgba(2, 1, vec![120, 0, 0, 0, 124, 0, 0, 0]).expect("b");
        let diff = pixel_diff(&a, &b).expect("diff");
        assert!(!diff.mask.get(0, 0));
        assert!(diff.mask.get(1, 0));
        assert_eq!(diff.diff_percent, 50.0);
        assert_eq!(diff.diff_image.pixel(0, 0), Some([255, 0, 0, 0]));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let a = ImageFrame::filled(2, 2, [0, 0, 0, 255]);
        let b = ImageFrame::filled(2, 3, [0, 0, 0, 255]);
        assert!(pixel_diff(&a, &b).is_err());
    }

    #[test]
    fn inputs_are_left_untouched() {
        let a = ImageFrame::filled(4, 4, [0, 0, 0, 255]);
        let b = a.with_rect(0, 0, 2, 2, [255, 255, 255, 255]);
        let (a_before, b_before) = (a.clone(), b.clone());
        pixel_diff(&a, &b).expect("diff");
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }
}
