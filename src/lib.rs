//! led2bin converts animated GIFs into a fixed-layout binary stream for LED matrix playback.
//!
//! # Pipeline overview
//!
//! 1. **Timing**: `&[u8] -> ContainerTimingInfo`. The GIF block structure is walked to count
//!    frames and collect delays; pixel data is never decoded here.
//! 2. **Rasterize**: a [`Rasterizer`] decodes the image and resamples it to the matrix size.
//! 3. **Pack**: `ContainerTimingInfo + RasterFrame -> PackedBinary`, an 8-byte header followed
//!    by RGB triples in the configured [`ColorOrder`].
//!
//! [`convert_batch`] ties the three together per input; every input is independent and a
//! failure is reported on that input only.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Timing never fails**: malformed containers fall back to a static single-frame default.
//! - **No partial output**: a packed stream is either complete or not produced at all.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod container;
mod convert;
mod foundation;
mod pack;
mod raster;

pub use container::timing::{
    ContainerTimingInfo, DEFAULT_DELAY_MS, looks_like_container, parse_timing,
};
pub use convert::batch::{
    BatchOptions, BatchSummary, ConversionOutcome, ConversionResult, InputFile, convert_batch,
    convert_batch_with, convert_bytes, convert_file, convert_files_with, output_name,
};
pub use convert::config::{ConvertConfig, FrameMode};
pub use convert::output::{ensure_dir, write_outputs};
pub use foundation::core::{ColorOrder, RasterFrame};
pub use foundation::error::{LedError, LedResult};
pub use pack::packer::{HEADER_LEN, PackedBinary, effective_delay, pack, pack_frames, packed_len};
pub use raster::rasterizer::{ImageRasterizer, Rasterizer, ResizeFilter};
