//! Serialization of rasterized frames into the matrix playback format.
//!
//! Layout, all integers little-endian:
//!
//! | offset | type                    | field          |
//! |--------|-------------------------|----------------|
//! | 0      | `u32`                   | frame count    |
//! | 4      | `u32`                   | delay in ms    |
//! | 8      | `u8[frames * W * H * 3]` | pixel triples |
//!
//! Pixels are row-major, one triple per pixel in the configured [`ColorOrder`], alpha dropped.

use crate::container::timing::ContainerTimingInfo;
use crate::foundation::{
    core::{ColorOrder, RasterFrame, rgba_len},
    error::{LedError, LedResult},
};

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 8;

/// A complete packed stream ready for the playback device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedBinary {
    bytes: Vec<u8>,
}

impl PackedBinary {
    /// Frame count stored in the header.
    pub fn frame_count(&self) -> u32 {
        self.header_u32(0)
    }

    /// Delay in milliseconds stored in the header.
    pub fn delay_ms(&self) -> u32 {
        self.header_u32(4)
    }

    /// Pixel payload following the header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Whole stream, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; a packed stream carries at least its header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take ownership of the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn header_u32(&self, at: usize) -> u32 {
        let b = &self.bytes[at..at + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }
}

impl AsRef<[u8]> for PackedBinary {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// The delay written to the header: the average frame delay, floored at `min_delay_ms`.
pub fn effective_delay(timing: &ContainerTimingInfo, min_delay_ms: u32) -> u32 {
    timing.average_delay.max(min_delay_ms)
}

/// Exact packed size for `frame_count` frames on a `width x height` matrix.
pub fn packed_len(frame_count: u32, width: u32, height: u32) -> LedResult<usize> {
    (frame_count as usize)
        .checked_mul(width as usize)
        .and_then(|n| n.checked_mul(height as usize))
        .and_then(|n| n.checked_mul(3))
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or_else(|| LedError::validation("packed size overflows usize"))
}

/// Pack a single raster replicated across every frame declared by `timing`.
///
/// The same pixels are written `timing.frame_count` times; only one representative raster
/// is available on this path. See [`pack_frames`] for distinct per-frame content.
pub fn pack(
    timing: &ContainerTimingInfo,
    frame: &RasterFrame,
    matrix_width: u32,
    matrix_height: u32,
    color_order: ColorOrder,
    min_delay_ms: u32,
) -> LedResult<PackedBinary> {
    check_frame(frame, matrix_width, matrix_height)?;
    if timing.frame_count == 0 {
        return Err(LedError::validation("frame count must be at least 1"));
    }

    let mut out = Writer::new(
        timing.frame_count,
        effective_delay(timing, min_delay_ms),
        matrix_width,
        matrix_height,
    )?;
    let first = out.push_frame(frame, color_order);
    for _ in 1..timing.frame_count {
        out.repeat_frame(first.clone());
    }
    out.finish()
}

/// Pack one distinct raster per frame.
///
/// The header frame count is `frames.len()`; the delay is `average_delay` floored at
/// `min_delay_ms`.
pub fn pack_frames(
    frames: &[RasterFrame],
    average_delay: u32,
    matrix_width: u32,
    matrix_height: u32,
    color_order: ColorOrder,
    min_delay_ms: u32,
) -> LedResult<PackedBinary> {
    if frames.is_empty() {
        return Err(LedError::validation("at least one frame is required"));
    }
    let frame_count = u32::try_from(frames.len())
        .map_err(|_| LedError::validation("too many frames for a u32 header"))?;
    for frame in frames {
        check_frame(frame, matrix_width, matrix_height)?;
    }

    let mut out = Writer::new(
        frame_count,
        average_delay.max(min_delay_ms),
        matrix_width,
        matrix_height,
    )?;
    for frame in frames {
        out.push_frame(frame, color_order);
    }
    out.finish()
}

fn check_frame(frame: &RasterFrame, width: u32, height: u32) -> LedResult<()> {
    if width == 0 || height == 0 {
        return Err(LedError::validation(format!(
            "matrix must be at least 1x1, got {width}x{height}"
        )));
    }
    if !frame.matches(width, height) {
        return Err(LedError::validation(format!(
            "raster is {}x{} but matrix is {width}x{height}",
            frame.width, frame.height
        )));
    }
    let expected = rgba_len(width, height)?;
    if frame.data.len() != expected {
        return Err(LedError::validation(format!(
            "raster buffer must be {expected} bytes, got {}",
            frame.data.len()
        )));
    }
    Ok(())
}

/// Exact-capacity output buffer. Only [`Writer::finish`] releases the bytes, after the
/// length has been checked.
struct Writer {
    bytes: Vec<u8>,
    expected: usize,
}

impl Writer {
    fn new(frame_count: u32, delay_ms: u32, width: u32, height: u32) -> LedResult<Self> {
        let expected = packed_len(frame_count, width, height)?;
        let mut bytes = Vec::with_capacity(expected);
        bytes.extend_from_slice(&frame_count.to_le_bytes());
        bytes.extend_from_slice(&delay_ms.to_le_bytes());
        Ok(Self { bytes, expected })
    }

    /// Append one frame and return the range it occupies.
    fn push_frame(&mut self, frame: &RasterFrame, order: ColorOrder) -> std::ops::Range<usize> {
        let start = self.bytes.len();
        for px in frame.data.chunks_exact(4) {
            self.bytes.extend_from_slice(&order.apply(px[0], px[1], px[2]));
        }
        start..self.bytes.len()
    }

    fn repeat_frame(&mut self, range: std::ops::Range<usize>) {
        self.bytes.extend_from_within(range);
    }

    fn finish(self) -> LedResult<PackedBinary> {
        if self.bytes.len() != self.expected {
            return Err(LedError::validation(format!(
                "packed {} bytes, expected {}",
                self.bytes.len(),
                self.expected
            )));
        }
        Ok(PackedBinary { bytes: self.bytes })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pack/packer.rs"]
mod tests;
