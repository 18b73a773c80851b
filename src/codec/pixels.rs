//! Owned RGBA8 pixel buffers and the packed-word views used by completeness scans.
//!
//! Layout is row-major, 4 interleaved straight-alpha bytes per pixel (`r, g, b, a`). Reading the
//! 4 bytes of a pixel as one native-endian `u32` gives its packed word: the word is zero iff every
//! channel is zero, whatever the byte order.

use crate::foundation::core::{Canvas, PixelPos, Rgba8};
use crate::foundation::error::{PixelspreadError, PixelspreadResult};

/// Owned, row-major RGBA8 pixel storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    canvas: Canvas,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            data: vec![0; canvas.byte_len()],
        }
    }

    /// Wrap raw bytes. The length must be exactly `width * height * 4`.
    pub fn from_raw(canvas: Canvas, data: Vec<u8>) -> PixelspreadResult<Self> {
        if data.len() != canvas.byte_len() {
            return Err(PixelspreadError::validation(format!(
                "pixel buffer length {} does not match {}x{} rgba8 ({} bytes)",
                data.len(),
                canvas.width,
                canvas.height,
                canvas.byte_len()
            )));
        }
        Ok(Self { canvas, data })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    pub fn pixel_count(&self) -> usize {
        self.canvas.pixel_count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn get(&self, p: PixelPos) -> Option<Rgba8> {
        let i = self.canvas.pixel_index(p)?;
        Some(self.pixel_at(i))
    }

    /// Pixel by linear index. Panics when `index >= pixel_count()`.
    pub fn pixel_at(&self, index: usize) -> Rgba8 {
        let o = index * 4;
        Rgba8::from_bytes([
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ])
    }

    pub fn set(&mut self, p: PixelPos, px: Rgba8) -> bool {
        let Some(i) = self.canvas.pixel_index(p) else {
            return false;
        };
        self.data[i * 4..i * 4 + 4].copy_from_slice(&px.to_bytes());
        true
    }

    pub fn alpha_at(&self, index: usize) -> u8 {
        self.data[index * 4 + 3]
    }

    /// Packed 32-bit word of the pixel at `index`.
    pub fn packed_at(&self, index: usize) -> u32 {
        let o = index * 4;
        pack_word([
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ])
    }

    /// Iterate packed words starting at pixel `start`.
    pub fn packed_words_from(&self, start: usize) -> impl Iterator<Item = u32> + '_ {
        let from = start.saturating_mul(4).min(self.data.len());
        self.data[from..]
            .chunks_exact(4)
            .map(|px| pack_word([px[0], px[1], px[2], px[3]]))
    }

    /// Iterate alpha channels starting at pixel `start`.
    pub fn alphas_from(&self, start: usize) -> impl Iterator<Item = u8> + '_ {
        let from = start.saturating_mul(4).min(self.data.len());
        self.data[from..].chunks_exact(4).map(|px| px[3])
    }

    pub fn count_opaque(&self) -> usize {
        self.alphas_from(0).filter(|&a| a == 255).count()
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Copy the overlapping top-left region of `src` into `self`; everything else becomes
    /// transparent.
    pub fn blit_cropped(&mut self, src: &PixelBuffer) {
        self.clear();
        let w = self.canvas.width.min(src.canvas.width) as usize;
        let h = self.canvas.height.min(src.canvas.height) as usize;
        let dst_stride = self.canvas.width as usize * 4;
        let src_stride = src.canvas.width as usize * 4;
        for y in 0..h {
            let d = y * dst_stride;
            let s = y * src_stride;
            self.data[d..d + w * 4].copy_from_slice(&src.data[s..s + w * 4]);
        }
    }

    /// Reallocate to `canvas`, dropping all content.
    pub(crate) fn reset_to(&mut self, canvas: Canvas) {
        self.canvas = canvas;
        self.data.clear();
        self.data.resize(canvas.byte_len(), 0);
    }
}

pub fn pack_word(px: [u8; 4]) -> u32 {
    u32::from_ne_bytes(px)
}

pub fn unpack_word(word: u32) -> [u8; 4] {
    word.to_ne_bytes()
}

#[cfg(test)]
#[path = "../../tests/unit/codec/pixels.rs"]
mod tests;
