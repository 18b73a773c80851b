//! The fixed stochastic transition program applied to every pixel on each tick.
//!
//! The rule is a pure function of `(pixel, neighbors, seed, params)`: given the same display
//! surface and seed it produces the same output no matter how rows are split across threads.

use crate::codec::pixels::PixelBuffer;
use crate::foundation::core::{Rgb8, Rgba8};
use crate::foundation::error::{PixelspreadError, PixelspreadResult};
use crate::foundation::math::offset_channel;
use crate::foundation::rng::pixel_rng;
use rayon::prelude::*;

/// Which way the feedback loop is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Fill: transparent pixels next to painted ones become painted.
    Paint,
    /// Clear: painted pixels drop to fully transparent.
    Dissolve,
}

/// Tunable inputs of the transition program.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransitionParams {
    /// Per-tick chance that a transparent pixel touching a painted one gets painted.
    pub fill_probability: f64,
    /// Per-tick chance that a painted pixel dissolves.
    pub dissolve_probability: f64,
    /// Width of the per-channel jitter band (8-bit units) when a color spreads.
    pub color_variability: f64,
}

impl Default for TransitionParams {
    fn default() -> Self {
        Self {
            fill_probability: 0.3,
            dissolve_probability: 0.03,
            color_variability: 10.0,
        }
    }
}

impl TransitionParams {
    pub fn validate(&self) -> PixelspreadResult<()> {
        for (name, p) in [
            ("fill_probability", self.fill_probability),
            ("dissolve_probability", self.dissolve_probability),
        ] {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(PixelspreadError::validation(format!(
                    "transition.{name} must be finite and within [0, 1]"
                )));
            }
        }
        if !self.color_variability.is_finite() || self.color_variability < 0.0 {
            return Err(PixelspreadError::validation(
                "transition.color_variability must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// 8-neighborhood offsets, row-major.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Paint rule for one pixel.
///
/// Opaque pixels are kept as is. A transparent pixel with at least one opaque neighbor becomes
/// opaque with probability `fill_probability`, copying a random opaque neighbor's color jittered
/// per channel by up to `color_variability / 2`.
pub fn paint_pixel(
    current: Rgba8,
    neighbors: &[Rgba8; 8],
    seed: u64,
    x: u32,
    y: u32,
    params: &TransitionParams,
) -> Rgba8 {
    if current.is_opaque() {
        return current;
    }

    let mut rng = pixel_rng(seed, x, y);
    if rng.next_f64_01() >= params.fill_probability {
        return current;
    }

    let opaque = neighbors.iter().filter(|n| n.is_opaque()).count();
    if opaque == 0 {
        return current;
    }
    let pick = ((rng.next_f64_01() * opaque as f64) as usize).min(opaque - 1);
    let Some(source) = neighbors.iter().filter(|n| n.is_opaque()).nth(pick) else {
        return current;
    };

    let mut c = source.rgb().channels();
    for ch in &mut c {
        *ch = offset_channel(*ch, rng.next_jitter(params.color_variability));
    }
    Rgba8::opaque(Rgb8::from_channels(c))
}

/// Dissolve rule for one pixel.
///
/// A pixel with any alpha drops to all-zero channels with probability `dissolve_probability`.
/// Transparent pixels stay transparent.
pub fn dissolve_pixel(
    current: Rgba8,
    seed: u64,
    x: u32,
    y: u32,
    params: &TransitionParams,
) -> Rgba8 {
    if current.is_transparent() {
        return Rgba8::TRANSPARENT;
    }
    let mut rng = pixel_rng(seed, x, y);
    if rng.next_f64_01() < params.dissolve_probability {
        Rgba8::TRANSPARENT
    } else {
        current
    }
}

fn gather_neighbors(src: &PixelBuffer, x: u32, y: u32) -> [Rgba8; 8] {
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let mut out = [Rgba8::TRANSPARENT; 8];
    for (slot, (dx, dy)) in out.iter_mut().zip(NEIGHBORS) {
        let (nx, ny) = (i64::from(x) + dx, i64::from(y) + dy);
        if nx >= 0 && ny >= 0 && nx < w && ny < h {
            *slot = src.pixel_at((ny * w + nx) as usize);
        }
    }
    out
}

/// Run the transition program over `src`, writing every pixel of `dst`.
///
/// Both buffers must share dimensions. Rows are processed in parallel on the rayon pool.
pub(crate) fn apply_transition(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    direction: Direction,
    seed: u64,
    params: &TransitionParams,
) {
    debug_assert_eq!(src.canvas(), dst.canvas());
    let width = src.width();
    let stride = width as usize * 4;
    if stride == 0 {
        return;
    }
    let params = *params;

    dst.as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(row, out)| {
            let y = row as u32;
            let base = row * width as usize;
            for x in 0..width {
                let current = src.pixel_at(base + x as usize);
                let next = match direction {
                    Direction::Paint => {
                        if current.is_opaque() {
                            current
                        } else {
                            let n = gather_neighbors(src, x, y);
                            paint_pixel(current, &n, seed, x, y, &params)
                        }
                    }
                    Direction::Dissolve => dissolve_pixel(current, seed, x, y, &params),
                };
                let o = x as usize * 4;
                out[o..o + 4].copy_from_slice(&next.to_bytes());
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/render/transition.rs"]
mod tests;
