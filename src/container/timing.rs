//! Timing extraction from GIF block structure.
//!
//! The parser walks extension and image blocks only far enough to find graphic control delays
//! and count frames. LZW image data is skipped, never decoded.

use crate::container::reader::{ByteCursor, ReadResult};

/// Delay used for frames without a graphic control extension, and for encoded zero delays.
pub const DEFAULT_DELAY_MS: u32 = 100;

const SIGNATURE: &[u8; 3] = b"GIF";

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const GRAPHIC_CONTROL_LEN: u8 = 4;

/// Canvas size, frame count and per-frame delays extracted from a container.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerTimingInfo {
    /// Logical screen width.
    pub width: u16,
    /// Logical screen height.
    pub height: u16,
    /// Number of image blocks, at least 1.
    pub frame_count: u32,
    /// Display delay per frame in milliseconds. Never empty.
    pub delays: Vec<u32>,
    /// Rounded mean of `delays`.
    pub average_delay: u32,
    /// More than one image block was found.
    pub is_animated: bool,
}

impl Default for ContainerTimingInfo {
    /// The static single-frame assumption used whenever parsing fails.
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            frame_count: 1,
            delays: vec![DEFAULT_DELAY_MS],
            average_delay: DEFAULT_DELAY_MS,
            is_animated: false,
        }
    }
}

impl ContainerTimingInfo {
    /// Sum of all frame delays in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.delays.iter().map(|&d| u64::from(d)).sum()
    }

    fn from_scan(width: u16, height: u16, delays: Vec<u32>) -> Self {
        let frames_seen = u32::try_from(delays.len()).unwrap_or(u32::MAX);
        let average_delay = rounded_mean(&delays).unwrap_or(DEFAULT_DELAY_MS);
        let delays = if delays.is_empty() {
            vec![DEFAULT_DELAY_MS]
        } else {
            delays
        };
        Self {
            width,
            height,
            frame_count: frames_seen.max(1),
            delays,
            average_delay,
            is_animated: frames_seen > 1,
        }
    }
}

/// Whether `bytes` starts with the GIF signature.
pub fn looks_like_container(bytes: &[u8]) -> bool {
    bytes.starts_with(SIGNATURE)
}

/// Extract timing metadata from raw container bytes.
///
/// Never fails: a bad signature or a truncated stream yields
/// [`ContainerTimingInfo::default`].
pub fn parse_timing(bytes: &[u8]) -> ContainerTimingInfo {
    if !looks_like_container(bytes) {
        tracing::debug!(len = bytes.len(), "missing GIF signature, using default timing");
        return ContainerTimingInfo::default();
    }
    match scan(bytes) {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!(offset = e.at, "truncated GIF stream, using default timing");
            ContainerTimingInfo::default()
        }
    }
}

fn scan(bytes: &[u8]) -> ReadResult<ContainerTimingInfo> {
    let mut cur = ByteCursor::new(bytes);

    // Signature and version; the signature was checked by the caller.
    cur.skip(6)?;

    let width = cur.read_u16_le()?;
    let height = cur.read_u16_le()?;
    let packed = cur.read_u8()?;
    cur.skip(2)?; // background index, pixel aspect ratio
    if let Some(len) = color_table_len(packed) {
        cur.skip(len)?;
    }

    let mut pending_delay = DEFAULT_DELAY_MS;
    let mut delays = Vec::new();

    while cur.has_remaining() {
        match cur.read_u8()? {
            EXTENSION_INTRODUCER => {
                if cur.read_u8()? == GRAPHIC_CONTROL_LABEL {
                    // A control block with an unexpected size is left for the outer loop.
                    if cur.read_u8()? == GRAPHIC_CONTROL_LEN {
                        cur.skip(1)?; // disposal/transparency flags
                        pending_delay = centis_to_ms(cur.read_u16_le()?);
                        cur.skip(2)?; // transparent index, terminator
                    }
                } else {
                    cur.skip_sub_blocks()?;
                }
            }
            IMAGE_SEPARATOR => {
                cur.skip(8)?; // left, top, width, height
                let local = cur.read_u8()?;
                if let Some(len) = color_table_len(local) {
                    cur.skip(len)?;
                }
                cur.skip(1)?; // LZW minimum code size
                cur.skip_sub_blocks()?;

                delays.push(pending_delay);
                pending_delay = DEFAULT_DELAY_MS;
            }
            TRAILER => break,
            _ => {}
        }
    }

    tracing::trace!(consumed = cur.pos(), frames = delays.len(), "scanned GIF blocks");
    Ok(ContainerTimingInfo::from_scan(width, height, delays))
}

/// Byte length of the color table announced by a packed descriptor, if present.
fn color_table_len(packed: u8) -> Option<usize> {
    if packed & 0x80 == 0 {
        return None;
    }
    let entries = 2usize << (packed & 0x07);
    Some(entries * 3)
}

fn centis_to_ms(centis: u16) -> u32 {
    match u32::from(centis) * 10 {
        0 => DEFAULT_DELAY_MS,
        ms => ms,
    }
}

/// Mean rounded half-up, `None` for an empty slice.
fn rounded_mean(values: &[u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as u64;
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    Some(((sum + n / 2) / n) as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/container/timing.rs"]
mod tests;
