use crate::codec::pixels::PixelBuffer;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::rng::Rng64;
use crate::render::targets::RenderTargetPair;
use crate::render::transition::{Direction, TransitionParams, apply_transition};
use crate::stroke::rasterizer::StrokePath;

/// Double-buffered feedback loop: each tick renders the display surface through the transition
/// program into the back buffer, then the two swap roles.
#[derive(Debug)]
pub struct FeedbackRenderLoop {
    targets: RenderTargetPair,
    params: TransitionParams,
    seeds: Rng64,
    seed: u64,
    ticks: u64,
}

impl FeedbackRenderLoop {
    pub fn new(canvas: Canvas, params: TransitionParams, seed: u64) -> Self {
        let mut seeds = Rng64::new(seed);
        let seed = seeds.next_u64();
        Self {
            targets: RenderTargetPair::new(canvas),
            params,
            seeds,
            seed,
            ticks: 0,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.targets.canvas()
    }

    pub fn params(&self) -> &TransitionParams {
        &self.params
    }

    pub fn set_params(&mut self, params: TransitionParams) {
        self.params = params;
    }

    /// Seed the next tick will use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Total display/back role swaps, including the one performed by each resize.
    pub fn swap_count(&self) -> u64 {
        self.targets.swap_count()
    }

    pub fn display_index(&self) -> usize {
        self.targets.display_index()
    }

    pub fn display(&self) -> &PixelBuffer {
        self.targets.display()
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self, direction: Direction) {
        {
            let (display, back) = self.targets.split();
            apply_transition(display, back, direction, self.seed, &self.params);
        }
        self.targets.swap();
        self.ticks += 1;
        self.seed = self.seeds.next_u64();
    }

    /// Write a stroke straight onto the display surface without running the transition.
    ///
    /// Only pixels whose alpha is zero are written, so already committed pixels are never
    /// overwritten and merging the same path twice changes nothing. Returns the number of pixels
    /// written.
    pub fn merge_stroke(&mut self, path: &StrokePath) -> usize {
        let display = self.targets.display_mut();
        let canvas = display.canvas();
        let mut written = 0;
        for px in path.pixels() {
            let Some(i) = canvas.pixel_index(px.pos) else {
                continue;
            };
            if display.alpha_at(i) != 0 {
                continue;
            }
            display.set(px.pos, Rgba8::opaque(px.color));
            written += 1;
        }
        written
    }

    /// Resize both surfaces, keeping what is currently displayed.
    #[tracing::instrument(skip(self), fields(from = ?self.canvas()))]
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let resized = self.targets.resize(Canvas::new(width, height));
        if resized {
            tracing::debug!("render targets resized");
        }
        resized
    }

    /// Owned copy of the display surface, safe to hand to another thread.
    pub fn snapshot(&self) -> PixelBuffer {
        self.targets.display().clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/feedback.rs"]
mod tests;
