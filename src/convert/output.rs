use std::path::{Path, PathBuf};

use crate::{
    convert::batch::ConversionResult,
    foundation::error::{LedError, LedResult},
};

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> LedResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| LedError::io(format!("create output dir '{}': {e}", dir.display())))
}

/// Write every successful result to `out_dir/<output_name>`. Failures are skipped.
///
/// Returns the written paths in result order. With `overwrite == false` an existing file is an
/// error and nothing further is written.
pub fn write_outputs(
    results: &[ConversionResult],
    out_dir: &Path,
    overwrite: bool,
) -> LedResult<Vec<PathBuf>> {
    ensure_dir(out_dir)?;
    let mut written = Vec::new();
    for r in results {
        let Some(data) = r.data() else {
            continue;
        };
        let path = out_dir.join(&r.output_name);
        if !overwrite && path.exists() {
            return Err(LedError::io(format!(
                "output '{}' already exists",
                path.display()
            )));
        }
        std::fs::write(&path, data.as_bytes())
            .map_err(|e| LedError::io(format!("write '{}': {e}", path.display())))?;
        tracing::info!(path = %path.display(), bytes = data.len(), "wrote packed stream");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/output.rs"]
mod tests;
