use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::core::{ColorOrder, RasterFrame};

/// Fills every frame with a fixed color; fails on inputs starting with `b"bad"`.
struct FakeRasterizer {
    rgba: [u8; 4],
    calls: AtomicUsize,
}

impl FakeRasterizer {
    fn new(rgba: [u8; 4]) -> Self {
        Self {
            rgba,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn resize(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<RasterFrame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes.starts_with(b"bad") {
            return Err(LedError::raster("unsupported format"));
        }
        RasterFrame::solid(width, height, self.rgba)
    }

    fn resize_frames(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<Vec<RasterFrame>> {
        let first = self.resize(bytes, width, height)?;
        let second = RasterFrame::solid(width, height, [0, 0, 0, 255])?;
        Ok(vec![first, second])
    }
}

/// Returns a raster that ignores the requested size.
struct WrongSizeRasterizer;

impl Rasterizer for WrongSizeRasterizer {
    fn resize(&self, _bytes: &[u8], _width: u32, _height: u32) -> LedResult<RasterFrame> {
        RasterFrame::solid(1, 1, [0, 0, 0, 255])
    }

    fn resize_frames(&self, bytes: &[u8], width: u32, height: u32) -> LedResult<Vec<RasterFrame>> {
        Ok(vec![self.resize(bytes, width, height)?])
    }
}

fn two_frame_gif(centis: u16) -> Vec<u8> {
    let mut b = b"GIF89a".to_vec();
    b.extend_from_slice(&[4, 0, 4, 0, 0, 0, 0]);
    for _ in 0..2 {
        b.extend_from_slice(&[0x21, 0xF9, 4, 0]);
        b.extend_from_slice(&centis.to_le_bytes());
        b.extend_from_slice(&[0, 0]);
        b.push(0x2C);
        b.extend_from_slice(&[0; 8]);
        b.extend_from_slice(&[0, 2, 1, 0, 0]);
    }
    b.push(0x3B);
    b
}

fn config(width: u32, height: u32) -> ConvertConfig {
    ConvertConfig {
        matrix_width: width,
        matrix_height: height,
        ..ConvertConfig::default()
    }
}

fn input(name: &str, bytes: Vec<u8>) -> InputFile {
    InputFile {
        name: name.to_string(),
        bytes,
    }
}

#[test]
fn two_frame_container_packs_to_392_bytes() {
    let r = FakeRasterizer::new([10, 20, 30, 255]);
    let result = convert_bytes(0, "a.gif", &two_frame_gif(5), &config(8, 8), &r);

    assert!(result.is_success());
    assert_eq!(result.output_name, "gif1.bin");
    let ConversionOutcome::Success {
        data,
        frame_count,
        effective_delay_ms,
        size_bytes,
        timing,
    } = &result.outcome
    else {
        panic!("expected success");
    };
    assert_eq!(*frame_count, 2);
    assert_eq!(*effective_delay_ms, 50);
    assert_eq!(*size_bytes, 392);
    assert_eq!(data.len(), 392);
    assert_eq!(&data.as_bytes()[..8], &[2, 0, 0, 0, 50, 0, 0, 0]);
    assert_eq!(timing.delays, vec![50, 50]);
}

#[test]
fn min_delay_and_color_order_come_from_config() {
    let r = FakeRasterizer::new([10, 20, 30, 255]);
    let cfg = ConvertConfig {
        color_order: ColorOrder::Bgr,
        min_delay_ms: 120,
        ..config(1, 1)
    };
    let result = convert_bytes(0, "a.gif", &two_frame_gif(5), &cfg, &r);
    let data = result.data().unwrap();
    assert_eq!(data.delay_ms(), 120);
    assert_eq!(data.payload(), &[30, 20, 10, 30, 20, 10]);
}

#[test]
fn non_container_input_still_packs_with_default_timing() {
    let r = FakeRasterizer::new([1, 2, 3, 255]);
    let result = convert_bytes(0, "a.png", b"\x89PNG....", &config(2, 2), &r);
    let data = result.data().unwrap();
    assert_eq!(data.frame_count(), 1);
    assert_eq!(data.delay_ms(), 100);
    assert_eq!(data.len(), 8 + 2 * 2 * 3);
}

#[test]
fn rasterizer_failure_becomes_failure_result() {
    let r = FakeRasterizer::new([0, 0, 0, 255]);
    let result = convert_bytes(3, "bad.gif", b"bad bytes", &config(4, 4), &r);
    assert!(!result.is_success());
    assert!(result.data().is_none());
    assert_eq!(result.output_name, "gif4.bin");
    let ConversionOutcome::Failure { reason } = &result.outcome else {
        panic!("expected failure");
    };
    assert!(reason.contains("unsupported format"));
}

#[test]
fn size_mismatch_from_rasterizer_is_a_failure() {
    let result = convert_bytes(
        0,
        "a.gif",
        &two_frame_gif(5),
        &config(4, 4),
        &WrongSizeRasterizer,
    );
    assert!(!result.is_success());
}

#[test]
fn per_frame_mode_uses_decoded_frames() {
    let r = FakeRasterizer::new([9, 9, 9, 255]);
    let cfg = ConvertConfig {
        frame_mode: FrameMode::PerFrame,
        ..config(1, 1)
    };
    let result = convert_bytes(0, "a.gif", &two_frame_gif(7), &cfg, &r);
    let data = result.data().unwrap();
    assert_eq!(data.frame_count(), 2);
    assert_eq!(data.delay_ms(), 70);
    assert_eq!(data.payload(), &[9, 9, 9, 0, 0, 0]);
}

#[test]
fn batch_keeps_going_after_failures() {
    let r = FakeRasterizer::new([5, 5, 5, 255]);
    let inputs = vec![
        input("one.gif", two_frame_gif(5)),
        input("two.gif", b"bad".to_vec()),
        input("three.gif", two_frame_gif(10)),
    ];
    let results = convert_batch(&inputs, &config(2, 2), &r);

    assert_eq!(results.len(), 3);
    assert_eq!(r.calls.load(Ordering::SeqCst), 3);
    let names: Vec<_> = results.iter().map(|r| r.output_name.as_str()).collect();
    assert_eq!(names, ["gif1.bin", "gif2.bin", "gif3.bin"]);
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert_eq!(results[2].data().unwrap().delay_ms(), 100);

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total_bytes, 2 * (8 + 2 * 2 * 2 * 3));
}

#[test]
fn parallel_batch_matches_sequential_order_and_bytes() {
    let r = FakeRasterizer::new([7, 8, 9, 255]);
    let inputs: Vec<_> = (0..12)
        .map(|i| input(&format!("{i}.gif"), two_frame_gif(i as u16)))
        .collect();
    let cfg = config(3, 2);

    let seq = convert_batch(&inputs, &cfg, &r);
    let par = convert_batch_with(
        &inputs,
        &cfg,
        &r,
        &BatchOptions {
            parallel: true,
            threads: Some(4),
            pause_ms: 0,
        },
    );

    assert_eq!(seq.len(), par.len());
    for (a, b) in seq.iter().zip(&par) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.source, b.source);
        assert_eq!(a.data().unwrap(), b.data().unwrap());
    }
}

#[test]
fn invalid_config_fails_every_input() {
    let r = FakeRasterizer::new([0, 0, 0, 255]);
    let inputs = vec![input("a.gif", two_frame_gif(1)), input("b.gif", two_frame_gif(1))];
    let results = convert_batch(&inputs, &config(0, 8), &r);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.is_success()));
    assert_eq!(r.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_file_is_a_failure_result() {
    let r = FakeRasterizer::new([0, 0, 0, 255]);
    let result = convert_file(
        0,
        Path::new("/nonexistent/led2bin/input.gif"),
        &config(2, 2),
        &r,
    );
    assert_eq!(result.source, "input.gif");
    assert!(!result.is_success());
}

#[test]
fn output_names_are_one_based() {
    assert_eq!(output_name(0), "gif1.bin");
    assert_eq!(output_name(9), "gif10.bin");
}

#[test]
fn file_batch_keeps_slots_for_unreadable_paths() {
    let dir = std::env::temp_dir().join(format!("led2bin_file_batch_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let good = dir.join("good.gif");
    std::fs::write(&good, two_frame_gif(5)).unwrap();

    let r = FakeRasterizer::new([1, 1, 1, 255]);
    let paths = vec![dir.join("missing.gif"), good];
    let results = convert_files_with(&paths, &config(2, 2), &r, &BatchOptions::default());

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].output_name, "gif1.bin");
    assert_eq!(results[0].source, "missing.gif");
    assert!(!results[0].is_success());
    assert_eq!(results[1].output_name, "gif2.bin");
    assert_eq!(results[1].source, "good.gif");
    assert_eq!(results[1].data().unwrap().frame_count(), 2);

    std::fs::remove_dir_all(&dir).ok();
}
