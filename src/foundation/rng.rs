/// Small deterministic PRNG (SplitMix64).
///
/// Every stochastic decision in the crate draws from an `Rng64` derived from the session seed, so a
/// replay with the same seed and input reproduces the same canvas.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// `round(rand() * 255)`.
    pub fn next_channel(&mut self) -> u8 {
        (self.next_f64_01() * 255.0).round() as u8
    }

    /// `round((rand() - 0.5) * variability)` as an offset to add to a channel.
    pub fn next_jitter(&mut self, variability: f64) -> f64 {
        ((self.next_f64_01() - 0.5) * variability).round()
    }
}

/// Stateless per-pixel generator: a fresh stream keyed by `(seed, x, y)`.
pub(crate) fn pixel_rng(seed: u64, x: u32, y: u32) -> Rng64 {
    let key = (u64::from(y) << 32) | u64::from(x);
    Rng64::new(seed ^ key.wrapping_mul(0xD6E8_FEB8_6659_FD93))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
