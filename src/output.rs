use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::PdfToolError;
use crate::orchestrator::OutputUnit;

/// Fail unless `path` names an existing regular file.
pub fn ensure_input_file(path: &Path) -> Result<(), PdfToolError> {
    if !path.is_file() {
        return Err(PdfToolError::MissingOrEmptyInput(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Create the directory the output file `path` will be written into.
pub fn ensure_parent_directory(path: &Path) -> Result<(), PdfToolError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => ensure_directory(dir),
        _ => Ok(()),
    }
}

/// Create `dir` and its missing ancestors.
pub fn ensure_directory(dir: &Path) -> Result<(), PdfToolError> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Refuse the first target that already exists unless `overwrite` is set.
///
/// This is a check, not a lock: a file created between the check and the
/// write will be replaced.
pub fn check_writable<'a, I>(targets: I, overwrite: bool) -> Result<(), PdfToolError>
where
    I: IntoIterator<Item = &'a Path>,
{
    if overwrite {
        return Ok(());
    }
    match targets.into_iter().find(|path| path.exists()) {
        Some(existing) => Err(PdfToolError::FileSystemConflict(existing.to_path_buf())),
        None => Ok(()),
    }
}

/// Where each unit lands inside `dir`.
pub fn unit_paths(dir: &Path, units: &[OutputUnit]) -> Vec<PathBuf> {
    units.iter().map(|unit| dir.join(&unit.file_name)).collect()
}

/// Write every unit into `dir`, returning the written paths in unit order.
pub fn write_units(dir: &Path, units: &[OutputUnit]) -> Result<Vec<PathBuf>, PdfToolError> {
    let paths = unit_paths(dir, units);
    for (path, unit) in paths.iter().zip(units) {
        std::fs::write(path, &unit.bytes)?;
        debug!("Wrote {} ({} pages)", path.display(), unit.page_count);
    }
    Ok(paths)
}
