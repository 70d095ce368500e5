use std::io::Cursor;

use anyhow::Context;
use image::{AnimationDecoder, RgbaImage, codecs::gif::GifDecoder, imageops};

use crate::container::timing::looks_like_container;
use crate::foundation::{
    core::RasterFrame,
    error::{LedError, LedResult},
};

/// Decodes encoded image bytes and resamples them to the matrix resolution.
///
/// Implementations must be usable from several conversion workers at once.
pub trait Rasterizer: Send + Sync {
    /// Rasterize one representative frame (the first) at `width x height`.
    fn resize(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<RasterFrame>;

    /// Rasterize every frame of an animation at `width x height`, in display order.
    fn resize_frames(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<Vec<RasterFrame>>;
}

/// Resampling kernel used by [`ImageRasterizer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest neighbor; keeps hard pixel-art edges.
    Nearest,
    /// Bilinear.
    Triangle,
    /// Bicubic.
    #[default]
    CatmullRom,
    /// Lanczos with a window of 3.
    Lanczos3,
}

impl ResizeFilter {
    fn filter_type(self) -> imageops::FilterType {
        match self {
            Self::Nearest => imageops::FilterType::Nearest,
            Self::Triangle => imageops::FilterType::Triangle,
            Self::CatmullRom => imageops::FilterType::CatmullRom,
            Self::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

/// [`Rasterizer`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRasterizer {
    filter: ResizeFilter,
}

impl ImageRasterizer {
    /// Create a rasterizer with the given resampling filter.
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    /// The configured resampling filter.
    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    fn fit(&self, rgba: &RgbaImage, width: u32, height: u32) -> LedResult<RasterFrame> {
        let out = if rgba.dimensions() == (width, height) {
            rgba.clone()
        } else {
            imageops::resize(rgba, width, height, self.filter.filter_type())
        };
        RasterFrame::new(width, height, out.into_raw())
    }
}

impl Rasterizer for ImageRasterizer {
    fn resize(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<RasterFrame> {
        check_target(width, height)?;
        let img = image::load_from_memory(bytes)
            .context("decode image from memory")
            .map_err(|e| LedError::raster(format!("{e:#}")))?;
        self.fit(&img.to_rgba8(), width, height)
    }

    fn resize_frames(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<Vec<RasterFrame>> {
        check_target(width, height)?;
        if !looks_like_container(bytes) {
            // Still images decode as a single frame.
            return Ok(vec![self.resize(bytes, width, height)?]);
        }
        let frames = GifDecoder::new(Cursor::new(bytes))
            .and_then(|decoder| decoder.into_frames().collect_frames())
            .context("decode gif frames")
            .map_err(|e| LedError::raster(format!("{e:#}")))?;
        if frames.is_empty() {
            return Err(LedError::raster("gif contains no frames"));
        }

        frames
            .into_iter()
            .map(|frame| self.fit(frame.buffer(), width, height))
            .collect()
    }
}

fn check_target(width: u32, height: u32) -> LedResult<()> {
    if width == 0 || height == 0 {
        return Err(LedError::validation(format!(
            "raster target must be at least 1x1, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterizer.rs"]
mod tests;
