use crate::foundation::core::{Canvas, PixelPos, Rgb8};
use crate::foundation::math::offset_channel;
use crate::foundation::rng::Rng64;

/// One emitted pixel of a stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StrokePixel {
    pub pos: PixelPos,
    pub color: Rgb8,
}

/// Ordered, gap-free pixel path produced by a stroke (or one segment of it).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrokePath {
    pixels: Vec<StrokePixel>,
}

impl StrokePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixels(&self) -> &[StrokePixel] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn push(&mut self, px: StrokePixel) {
        self.pixels.push(px);
    }

    pub fn append(&mut self, other: StrokePath) {
        self.pixels.extend(other.pixels);
    }

    pub fn positions(&self) -> impl Iterator<Item = PixelPos> + '_ {
        self.pixels.iter().map(|p| p.pos)
    }
}

impl FromIterator<StrokePixel> for StrokePath {
    fn from_iter<I: IntoIterator<Item = StrokePixel>>(iter: I) -> Self {
        Self {
            pixels: iter.into_iter().collect(),
        }
    }
}

/// Integer Bresenham walk from `from` (exclusive) to `to` (inclusive).
///
/// Every step moves at most one unit on each axis. `from == to` yields nothing.
#[derive(Clone, Debug)]
pub struct LineSteps {
    x: i64,
    y: i64,
    to_x: i64,
    to_y: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
}

impl LineSteps {
    pub fn new(from: PixelPos, to: PixelPos) -> Self {
        let (x, y) = (i64::from(from.x), i64::from(from.y));
        let (to_x, to_y) = (i64::from(to.x), i64::from(to.y));
        let dx = (to_x - x).abs();
        let dy = (to_y - y).abs();
        Self {
            x,
            y,
            to_x,
            to_y,
            dx,
            dy,
            sx: (to_x - x).signum(),
            sy: (to_y - y).signum(),
            err: dx - dy,
        }
    }
}

impl Iterator for LineSteps {
    type Item = PixelPos;

    fn next(&mut self) -> Option<PixelPos> {
        if self.x == self.to_x && self.y == self.to_y {
            return None;
        }
        let e2 = self.err << 1;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(PixelPos::new(self.x as i32, self.y as i32))
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveStroke {
    last: PixelPos,
    color: Rgb8,
}

/// Turns pointer samples into dense colored pixel paths.
///
/// The pointer color is reseeded at every [`StrokeRasterizer::begin`] and random-walks from one
/// emitted pixel to the next while the stroke is active.
#[derive(Clone, Debug)]
pub struct StrokeRasterizer {
    bounds: Canvas,
    variability: f64,
    rng: Rng64,
    active: Option<ActiveStroke>,
}

impl StrokeRasterizer {
    pub fn new(bounds: Canvas, variability: f64, seed: u64) -> Self {
        Self {
            bounds,
            variability,
            rng: Rng64::new(seed),
            active: None,
        }
    }

    pub fn bounds(&self) -> Canvas {
        self.bounds
    }

    /// Update the viewport used for clamping and filtering. An active stroke keeps going.
    pub fn set_bounds(&mut self, bounds: Canvas) {
        self.bounds = bounds;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Current pointer color of the active stroke.
    pub fn color(&self) -> Option<Rgb8> {
        self.active.map(|a| a.color)
    }

    /// Start a stroke at a raw pointer position. Emits exactly the (clamped) start pixel.
    pub fn begin(&mut self, x: f64, y: f64) -> StrokePath {
        let pos = self.bounds.clamp_point(x, y);
        let color = Rgb8::new(
            self.rng.next_channel(),
            self.rng.next_channel(),
            self.rng.next_channel(),
        );
        self.active = Some(ActiveStroke { last: pos, color });

        let mut path = StrokePath::new();
        if self.bounds.contains(pos) {
            path.push(StrokePixel { pos, color });
        }
        path
    }

    /// Extend the active stroke to a new raw pointer position.
    ///
    /// Returns the pixels strictly after the previous sample up to and including the new one.
    /// Without an active stroke nothing is emitted.
    pub fn extend(&mut self, x: f64, y: f64) -> StrokePath {
        let Some(mut active) = self.active else {
            return StrokePath::new();
        };
        let to = self.bounds.clamp_point(x, y);

        let mut path = StrokePath::new();
        for pos in LineSteps::new(active.last, to) {
            if !self.bounds.contains(pos) {
                continue;
            }
            active.color = self.walk(active.color);
            path.push(StrokePixel {
                pos,
                color: active.color,
            });
        }

        active.last = to;
        self.active = Some(active);
        path
    }

    /// Finish the active stroke. Returns whether one was active.
    pub fn end(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Rasterize a whole stroke from raw samples (first sample is the pointer-down position).
    pub fn rasterize(&mut self, samples: &[(f64, f64)]) -> StrokePath {
        let Some((&(x0, y0), rest)) = samples.split_first() else {
            return StrokePath::new();
        };
        let mut path = self.begin(x0, y0);
        for &(x, y) in rest {
            path.append(self.extend(x, y));
        }
        self.end();
        path
    }

    fn walk(&mut self, c: Rgb8) -> Rgb8 {
        let mut out = c.channels();
        for ch in &mut out {
            *ch = offset_channel(*ch, self.rng.next_jitter(self.variability));
        }
        Rgb8::from_channels(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stroke/rasterizer.rs"]
mod tests;
