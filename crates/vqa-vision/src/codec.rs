//! Narrow image capability used by the engine: decode, resize, encode.

use image::{
    codecs::png::PngEncoder, imageops::FilterType, ColorType, ImageBuffer, ImageEncoder, Rgba,
};
use vqa_types::{vision::ImageFrame, Result, VqaError};

use crate::vision_error;

pub trait ImageCodec: Send + Sync {
    /// Decodes an encoded image into RGBA samples.
    fn decode(&self, bytes: &[u8]) -> Result<ImageFrame>;
    /// Resamples `frame` to exactly `width` x `height`.
    fn resize(&self, frame: &ImageFrame, width: u32, height: u32) -> Result<ImageFrame>;
    /// Encodes `frame` as PNG.
    fn encode(&self, frame: &ImageFrame) -> Result<Vec<u8>>;
}

/// `image`-crate backed codec resampling with Lanczos3.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for RasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<ImageFrame> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| VqaError::Decode(format!("image decoding failed: {err}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(VqaError::Decode(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        ImageFrame::from_rgba(width, height, rgba.into_raw())
            .ok_or_else(|| VqaError::Decode("decoded buffer size mismatch".into()))
    }

    fn resize(&self, frame: &ImageFrame, width: u32, height: u32) -> Result<ImageFrame> {
        let Some(buffer) =
            ImageBuffer::<Rgba<u8>, _>::from_raw(frame.width, frame.height, frame.data.as_slice())
        else {
            return Err(vision_error("image buffer creation failed"));
        };
        let resized = image::imageops::resize(&buffer, width, height, FilterType::Lanczos3);
        ImageFrame::from_rgba(width, height, resized.into_raw())
            .ok_or_else(|| vision_error("resized buffer size mismatch"))
    }

    fn encode(&self, frame: &ImageFrame) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(&frame.data, frame.width, frame.height, ColorType::Rgba8)
            .map_err(|err| vision_error(format!("png encoding failed: {err}")))?;
        Ok(bytes)
    }
}
