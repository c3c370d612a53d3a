use serde::{Deserialize, Serialize};

/// Number of interleaved 8-bit samples per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// Decoded raster image held as interleaved RGBA samples.
///
/// Frames are never mutated in place by the engine; every transformation
/// (resizing, diff rendering) produces a new frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    /// Raw RGBA pixel buffer, row-major, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl ImageFrame {
    /// Wraps a raw RGBA buffer, rejecting buffers whose length does not match
    /// the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(CHANNELS)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Frame filled with a single RGBA colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.data.get(offset..offset + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns a copy with the given rectangle painted in `rgba`. Coordinates
    /// outside the frame are clipped.
    pub fn with_rect(&self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut out = self.clone();
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y.min(y_end)..y_end {
            for col in x.min(x_end)..x_end {
                let offset = (row as usize * self.width as usize + col as usize) * CHANNELS;
                out.data[offset..offset + CHANNELS].copy_from_slice(&rgba);
            }
        }
        out
    }
}
