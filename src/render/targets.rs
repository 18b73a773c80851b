use crate::codec::pixels::PixelBuffer;
use crate::foundation::core::Canvas;

/// Two equally sized surfaces plus the index of the one currently on display.
///
/// The other surface is the only one ever written by a render pass; sampling and writing the
/// same surface in one pass is never allowed.
#[derive(Debug)]
pub struct RenderTargetPair {
    surfaces: [PixelBuffer; 2],
    display: usize,
    swaps: u64,
}

impl RenderTargetPair {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            surfaces: [PixelBuffer::new(canvas), PixelBuffer::new(canvas)],
            display: 0,
            swaps: 0,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.surfaces[self.display].canvas()
    }

    pub fn display_index(&self) -> usize {
        self.display
    }

    /// Number of role swaps since creation.
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    pub fn display(&self) -> &PixelBuffer {
        &self.surfaces[self.display]
    }

    pub(crate) fn display_mut(&mut self) -> &mut PixelBuffer {
        &mut self.surfaces[self.display]
    }

    /// Split into `(display, back)` for a render pass.
    pub(crate) fn split(&mut self) -> (&PixelBuffer, &mut PixelBuffer) {
        let (a, b) = self.surfaces.split_at_mut(1);
        if self.display == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    pub(crate) fn swap(&mut self) {
        self.display = 1 - self.display;
        self.swaps += 1;
    }

    /// Resize both surfaces, carrying the displayed content over.
    ///
    /// The back buffer is reallocated at the new size and the display is rendered into it
    /// (cropped or padded with transparency), then roles swap and the old display is reallocated.
    /// Returns `false` when the size is unchanged.
    pub(crate) fn resize(&mut self, canvas: Canvas) -> bool {
        if canvas == self.canvas() {
            return false;
        }
        {
            let (display, back) = self.split();
            back.reset_to(canvas);
            back.blit_cropped(display);
        }
        self.swap();
        let old = 1 - self.display;
        self.surfaces[old].reset_to(canvas);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/targets.rs"]
mod tests;
