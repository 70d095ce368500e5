use crate::foundation::error::{LedError, LedResult};

/// Channel permutation applied to every packed pixel.
///
/// Text values are matched case-insensitively; anything unrecognized falls back to
/// [`ColorOrder::Rgb`], which is also the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Green, red, blue (common on WS2812-style strips).
    Grb,
    /// Blue, green, red.
    Bgr,
}

impl ColorOrder {
    /// Parse a configuration value. Never fails.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "grb" => Self::Grb,
            "bgr" => Self::Bgr,
            _ => Self::Rgb,
        }
    }

    /// Lowercase configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Grb => "grb",
            Self::Bgr => "bgr",
        }
    }

    /// Reorder an `(r, g, b)` triple into output byte order.
    #[inline]
    pub fn apply(self, r: u8, g: u8, b: u8) -> [u8; 3] {
        match self {
            Self::Rgb => [r, g, b],
            Self::Grb => [g, r, b],
            Self::Bgr => [b, g, r],
        }
    }
}

impl From<String> for ColorOrder {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ColorOrder> for String {
    fn from(order: ColorOrder) -> Self {
        order.as_str().to_string()
    }
}

impl std::fmt::Display for ColorOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rasterized frame as straight (non-premultiplied) RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl RasterFrame {
    /// Wrap an RGBA8 buffer, checking that its length matches `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> LedResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(LedError::validation(format!(
                "raster buffer for {width}x{height} must be {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with a single RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> LedResult<Self> {
        let len = rgba_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            data.extend_from_slice(&rgba);
        }
        Self::new(width, height, data)
    }

    /// RGBA of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Whether the frame covers exactly `width x height`.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> LedResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| LedError::validation("raster dimensions overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
