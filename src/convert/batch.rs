use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    container::timing::{ContainerTimingInfo, looks_like_container, parse_timing},
    convert::config::{ConvertConfig, FrameMode},
    foundation::error::{LedError, LedResult},
    pack::packer::{PackedBinary, pack, pack_frames},
    raster::rasterizer::Rasterizer,
};

/// One queued input: a display name and the raw file bytes.
#[derive(Clone, Debug)]
pub struct InputFile {
    /// Name used in reports, usually the source file name.
    pub name: String,
    /// Entire file content.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Read `path` into memory, naming the input after its file name.
    pub fn read(path: &Path) -> LedResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| LedError::io(format!("read '{}': {e}", path.display())))?;
        Ok(Self {
            name: display_name(path),
            bytes,
        })
    }
}

/// Outcome of converting one input.
#[derive(Clone, Debug)]
pub enum ConversionOutcome {
    /// The input was packed completely.
    Success {
        /// Packed stream.
        data: PackedBinary,
        /// Frame count written to the header.
        frame_count: u32,
        /// Delay written to the header.
        effective_delay_ms: u32,
        /// Size of `data` in bytes.
        size_bytes: usize,
        /// Timing extracted from the container.
        timing: ContainerTimingInfo,
    },
    /// The input could not be converted; nothing was produced.
    Failure {
        /// Human-readable cause.
        reason: String,
    },
}

/// Per-input conversion report.
#[derive(Clone, Debug)]
pub struct ConversionResult {
    /// Position of the input in the batch.
    pub index: usize,
    /// Source name of the input.
    pub source: String,
    /// Deterministic output file name, see [`output_name`].
    pub output_name: String,
    /// Success or failure.
    pub outcome: ConversionOutcome,
}

impl ConversionResult {
    /// Whether the conversion succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ConversionOutcome::Success { .. })
    }

    /// Packed stream, if the conversion succeeded.
    pub fn data(&self) -> Option<&PackedBinary> {
        match &self.outcome {
            ConversionOutcome::Success { data, .. } => Some(data),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    fn failed(index: usize, source: String, err: &LedError) -> Self {
        Self {
            index,
            source,
            output_name: output_name(index),
            outcome: ConversionOutcome::Failure {
                reason: err.to_string(),
            },
        }
    }
}

/// Output file name for the input at `index`: `gif1.bin`, `gif2.bin`, ...
pub fn output_name(index: usize) -> String {
    format!("gif{}.bin", index + 1)
}

/// Scheduling controls for [`convert_batch_with`].
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// Convert inputs on a thread pool instead of one after another.
    pub parallel: bool,
    /// Optional explicit worker thread count for parallel mode.
    pub threads: Option<usize>,
    /// Pause between inputs in sequential mode, in milliseconds.
    pub pause_ms: u64,
}

/// Aggregate counts over a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Inputs converted successfully.
    pub succeeded: usize,
    /// Inputs that failed.
    pub failed: usize,
    /// Total packed bytes across successes.
    pub total_bytes: usize,
}

impl BatchSummary {
    /// Tally a list of results.
    pub fn from_results(results: &[ConversionResult]) -> Self {
        let mut out = Self::default();
        for r in results {
            match &r.outcome {
                ConversionOutcome::Success { size_bytes, .. } => {
                    out.succeeded += 1;
                    out.total_bytes += size_bytes;
                }
                ConversionOutcome::Failure { .. } => out.failed += 1,
            }
        }
        out
    }
}

/// Convert one in-memory input. Errors are captured in the returned result.
#[tracing::instrument(skip(bytes, config, rasterizer), fields(len = bytes.len()))]
pub fn convert_bytes(
    index: usize,
    source: &str,
    bytes: &[u8],
    config: &ConvertConfig,
    rasterizer: &dyn Rasterizer,
) -> ConversionResult {
    if !looks_like_container(bytes) {
        tracing::warn!("input has no GIF signature, timing falls back to defaults");
    }
    match try_convert(bytes, config, rasterizer) {
        Ok((data, timing)) => {
            tracing::debug!(
                frames = data.frame_count(),
                delay_ms = data.delay_ms(),
                size = data.len(),
                "converted"
            );
            ConversionResult {
                index,
                source: source.to_string(),
                output_name: output_name(index),
                outcome: ConversionOutcome::Success {
                    frame_count: data.frame_count(),
                    effective_delay_ms: data.delay_ms(),
                    size_bytes: data.len(),
                    data,
                    timing,
                },
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "conversion failed");
            ConversionResult::failed(index, source.to_string(), &e)
        }
    }
}

/// Read and convert one file. Read errors are captured in the returned result.
pub fn convert_file(
    index: usize,
    path: &Path,
    config: &ConvertConfig,
    rasterizer: &dyn Rasterizer,
) -> ConversionResult {
    match InputFile::read(path) {
        Ok(input) => convert_bytes(index, &input.name, &input.bytes, config, rasterizer),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "input unreadable");
            ConversionResult::failed(index, display_name(path), &e)
        }
    }
}

/// Convert a batch sequentially with no pause. Results follow input order.
pub fn convert_batch(
    inputs: &[InputFile],
    config: &ConvertConfig,
    rasterizer: &dyn Rasterizer,
) -> Vec<ConversionResult> {
    convert_batch_with(inputs, config, rasterizer, &BatchOptions::default())
}

/// Convert a batch with explicit scheduling. Results follow input order in every mode.
///
/// A failing input never stops the others. An invalid configuration or thread pool failure
/// is reported as a failure for each input.
pub fn convert_batch_with(
    inputs: &[InputFile],
    config: &ConvertConfig,
    rasterizer: &dyn Rasterizer,
    opts: &BatchOptions,
) -> Vec<ConversionResult> {
    run_batch(
        inputs,
        |input| input.name.clone(),
        |i, input| convert_bytes(i, &input.name, &input.bytes, config, rasterizer),
        config,
        opts,
    )
}

/// Read and convert files with explicit scheduling. Output names follow path positions, so an
/// unreadable file still occupies its `gifN.bin` slot as a failure.
pub fn convert_files_with(
    paths: &[PathBuf],
    config: &ConvertConfig,
    rasterizer: &dyn Rasterizer,
    opts: &BatchOptions,
) -> Vec<ConversionResult> {
    run_batch(
        paths,
        |path| display_name(path),
        |i, path| convert_file(i, path, config, rasterizer),
        config,
        opts,
    )
}

fn run_batch<T, N, F>(
    items: &[T],
    name: N,
    convert: F,
    config: &ConvertConfig,
    opts: &BatchOptions,
) -> Vec<ConversionResult>
where
    T: Sync,
    N: Fn(&T) -> String,
    F: Fn(usize, &T) -> ConversionResult + Sync,
{
    let fail_all = |e: &LedError| -> Vec<ConversionResult> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| ConversionResult::failed(i, name(item), e))
            .collect()
    };
    if let Err(e) = config.validate() {
        return fail_all(&e);
    }

    if !opts.parallel {
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if i > 0 && opts.pause_ms > 0 {
                std::thread::sleep(std::time::Duration::from_millis(opts.pause_ms));
            }
            out.push(convert(i, item));
        }
        return out;
    }

    match build_thread_pool(opts.threads) {
        Ok(pool) => pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| convert(i, item))
                .collect::<Vec<_>>()
        }),
        Err(e) => fail_all(&e),
    }
}

fn try_convert(
    bytes: &[u8],
    config: &ConvertConfig,
    rasterizer: &dyn Rasterizer,
) -> LedResult<(PackedBinary, ContainerTimingInfo)> {
    config.validate()?;
    let timing = parse_timing(bytes);
    let (w, h) = (config.matrix_width, config.matrix_height);

    let data = match config.frame_mode {
        FrameMode::Replicate => {
            let frame = rasterizer.resize(bytes, w, h)?;
            pack(
                &timing,
                &frame,
                w,
                h,
                config.color_order,
                config.min_delay_ms,
            )?
        }
        FrameMode::PerFrame => {
            let frames = rasterizer.resize_frames(bytes, w, h)?;
            if frames.len() != timing.frame_count as usize {
                tracing::debug!(
                    decoded = frames.len(),
                    declared = timing.frame_count,
                    "decoded frame count differs from container timing"
                );
            }
            pack_frames(
                &frames,
                timing.average_delay,
                w,
                h,
                config.color_order,
                config.min_delay_ms,
            )?
        }
    };
    Ok((data, timing))
}

fn build_thread_pool(threads: Option<usize>) -> LedResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n.max(1));
    }
    builder
        .build()
        .map_err(|e| LedError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/convert/batch.rs"]
mod tests;
