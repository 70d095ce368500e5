use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    core::ColorOrder,
    error::{LedError, LedResult},
};

/// How frames are sourced for the packed stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameMode {
    /// Rasterize one representative frame and repeat it for every frame the container declares.
    #[default]
    Replicate,
    /// Decode and rasterize every frame independently.
    PerFrame,
}

/// Output settings shared by every file in a batch.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Matrix width in pixels.
    pub matrix_width: u32,
    /// Matrix height in pixels.
    pub matrix_height: u32,
    /// Channel order expected by the LED driver.
    pub color_order: ColorOrder,
    /// Lower bound for the delay written to the header.
    pub min_delay_ms: u32,
    /// Frame sourcing strategy.
    pub frame_mode: FrameMode,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            matrix_width: 16,
            matrix_height: 16,
            color_order: ColorOrder::Rgb,
            min_delay_ms: 0,
            frame_mode: FrameMode::Replicate,
        }
    }
}

impl ConvertConfig {
    /// Reject configurations that cannot produce a packed stream.
    pub fn validate(&self) -> LedResult<()> {
        if self.matrix_width == 0 || self.matrix_height == 0 {
            return Err(LedError::validation(format!(
                "matrix size must be at least 1x1, got {}x{}",
                self.matrix_width, self.matrix_height
            )));
        }
        Ok(())
    }

    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> LedResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: &Path) -> LedResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedError::io(format!("read config '{}': {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/config.rs"]
mod tests;
