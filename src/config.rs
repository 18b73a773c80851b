use crate::foundation::core::Canvas;
use crate::foundation::error::{PixelspreadError, PixelspreadResult};
use crate::render::transition::TransitionParams;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

/// Everything a [`crate::PaintSession`] needs to start. Loaded from JSON; every field is optional.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Initial viewport width in pixels.
    pub width: u32,
    /// Initial viewport height in pixels.
    pub height: u32,
    /// Session seed; drives stroke colors and per-tick transition seeds.
    pub seed: u64,
    /// Transition program parameters.
    pub transition: TransitionParams,
    /// Random-walk band for stroke colors (8-bit units).
    pub stroke_color_variability: f64,
    /// Delay between an incomplete verdict and the next completion check.
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            seed: 0,
            transition: TransitionParams::default(),
            stroke_color_variability: 5.0,
            poll_interval_ms: 200,
        }
    }
}

impl SessionConfig {
    pub fn from_path(path: impl AsRef<Path>) -> PixelspreadResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PixelspreadError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_reader(r: impl Read) -> PixelspreadResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PixelspreadError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PixelspreadResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PixelspreadError::validation("width/height must be > 0"));
        }
        self.transition.validate()?;
        if !self.stroke_color_variability.is_finite() || self.stroke_color_variability < 0.0 {
            return Err(PixelspreadError::validation(
                "stroke_color_variability must be finite and >= 0",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(PixelspreadError::validation("poll_interval_ms must be > 0"));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
