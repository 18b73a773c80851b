use crate::codec::pixels::PixelBuffer;
use crate::foundation::error::{PixelspreadError, PixelspreadResult};
use crate::playback::machine::PlaybackState;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const JPEG_QUALITY: u8 = 92;

/// Raster format for canvas snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Lossless, keeps exact transparency of an unfinished canvas.
    Png,
    /// Lossy, only used once the canvas is fully opaque.
    Jpeg,
}

impl ExportFormat {
    pub fn for_state(state: PlaybackState) -> Self {
        if state == PlaybackState::Done {
            Self::Jpeg
        } else {
            Self::Png
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

pub fn ensure_parent_dir(path: &Path) -> PixelspreadResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            PixelspreadError::render(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }
    Ok(())
}

/// Write `pixels` to `path` with its extension replaced by the format's one.
///
/// Consumes the buffer so its bytes move into the encoder. Returns the path actually written.
#[tracing::instrument(skip(pixels), fields(width = pixels.width(), height = pixels.height()))]
pub fn export_pixels(
    pixels: PixelBuffer,
    path: &Path,
    format: ExportFormat,
) -> PixelspreadResult<PathBuf> {
    if pixels.canvas().is_empty() {
        return Err(PixelspreadError::render("cannot export an empty canvas"));
    }
    let out = path.with_extension(format.extension());
    ensure_parent_dir(&out)?;

    let (width, height) = (pixels.width(), pixels.height());
    let rgba = image::RgbaImage::from_raw(width, height, pixels.into_bytes())
        .ok_or_else(|| PixelspreadError::render("pixel buffer does not match its dimensions"))?;

    match format {
        ExportFormat::Png => {
            rgba.save_with_format(&out, image::ImageFormat::Png)
                .map_err(|e| {
                    PixelspreadError::render(format!("write png '{}': {e}", out.display()))
                })?;
        }
        ExportFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let f = File::create(&out).map_err(|e| {
                PixelspreadError::render(format!("create '{}': {e}", out.display()))
            })?;
            let mut w = BufWriter::new(f);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut w, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| {
                    PixelspreadError::render(format!("write jpeg '{}': {e}", out.display()))
                })?;
        }
    }

    tracing::info!(path = %out.display(), ?format, "canvas exported");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
