use super::*;
use crate::{
    container::timing::ContainerTimingInfo,
    convert::batch::{ConversionOutcome, output_name},
    foundation::core::{ColorOrder, RasterFrame},
    pack::packer::pack,
};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "led2bin_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn success(index: usize) -> ConversionResult {
    let timing = ContainerTimingInfo::default();
    let frame = RasterFrame::solid(2, 2, [index as u8, 0, 0, 255]).unwrap();
    let data = pack(&timing, &frame, 2, 2, ColorOrder::Rgb, 0).unwrap();
    ConversionResult {
        index,
        source: format!("in{index}.gif"),
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

fn failure(index: usize) -> ConversionResult {
    ConversionResult {
        index,
        source: format!("in{index}.gif"),
        output_name: output_name(index),
        outcome: ConversionOutcome::Failure {
            reason: "boom".to_string(),
        },
    }
}

#[test]
fn writes_successes_under_ordinal_names() {
    let dir = temp_dir("write_outputs");
    let results = vec![success(0), failure(1), success(2)];

    let written = write_outputs(&results, &dir, true).unwrap();
    assert_eq!(written, vec![dir.join("gif1.bin"), dir.join("gif3.bin")]);
    assert!(!dir.join("gif2.bin").exists());

    let bytes = std::fs::read(dir.join("gif3.bin")).unwrap();
    assert_eq!(bytes, results[2].data().unwrap().as_bytes());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let dir = temp_dir("no_overwrite");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("gif1.bin"), b"keep").unwrap();

    let err = write_outputs(&[success(0)], &dir, false).unwrap_err();
    assert!(matches!(err, LedError::Io(_)));
    assert_eq!(std::fs::read(dir.join("gif1.bin")).unwrap(), b"keep");

    write_outputs(&[success(0)], &dir, true).unwrap();
    assert_ne!(std::fs::read(dir.join("gif1.bin")).unwrap(), b"keep");

    std::fs::remove_dir_all(&dir).ok();
}
