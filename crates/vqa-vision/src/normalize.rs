use std::borrow::Cow;

use tracing::debug;
use vqa_types::{vision::ImageFrame, Result};

use crate::codec::ImageCodec;

/// Target size for comparing two frames: the larger extent on each axis.
pub fn comparison_size(a: &ImageFrame, b: &ImageFrame) -> (u32, u32) {
    (a.width.max(b.width), a.height.max(b.height))
}

/// Brings both frames to the same dimensions.
///
/// Equal-sized frames are borrowed untouched. Otherwise both are resampled
/// to [`comparison_size`], so a frame that already has the target size on one
/// axis is still stretched on the other.
pub fn normalize<'a, C>(
    codec: &C,
    a: &'a ImageFrame,
    b: &'a ImageFrame,
) -> Result<(Cow<'a, ImageFrame>, Cow<'a, ImageFrame>)>
where
    C: ImageCodec + ?Sized,
{
    if a.dimensions() == b.dimensions() {
        return Ok((Cow::Borrowed(a), Cow::Borrowed(b)));
    }

    let (width, height) = comparison_size(a, b);
    debug!(
        "Resizing {}x{} and {}x{} to {}x{}",
        a.width, a.height, b.width, b.height, width, height
    );
    Ok((
        Cow::Owned(codec.resize(a, width, height)?),
        Cow::Owned(codec.resize(b, width, height)?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RasterCodec;

    #[test]
    fn matching_sizes_are_borrowed() {
        let a = ImageFrame::filled(4, 4, [1, 2, 3, 255]);
        let b = ImageFrame::filled(4, 4, [9, 9, 9, 255]);
        let (na, nb) = normalize(&RasterCodec::new(), &a, &b).expect("normalize");
        assert!(matches!(na, Cow::Borrowed(_)));
        assert!(matches!(nb, Cow::Borrowed(_)));
    }

    #[test]
    fn mismatched_sizes_take_per_axis_max() {
        let a = ImageFrame::filled(100, 200, [0, 0, 0, 255]);
        let b = ImageFrame::filled(300, 100, [255, 255, 255, 255]);
        let (na, nb) = normalize(&RasterCodec::new(), &a, &b).expect("normalize");
        assert_eq!(na.dimensions(), (300, 200));
        assert_eq!(nb.dimensions(), (300, 200));
        assert_eq!(a.dimensions(), (100, 200));
        assert_eq!(b.dimensions(), (300, 100));
    }
}
