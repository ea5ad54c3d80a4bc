//! File I/O helpers used by the signing pipeline.

use crate::infra::error::{SigningError, SigningResult};
use std::fs::{self, File};
use std::path::Path;

/// Whether `path` exists and can be opened for reading.
#[must_use]
pub fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Read a whole file.
pub fn load_file(path: &Path) -> SigningResult<Vec<u8>> {
    let data = fs::read(path).map_err(|e| {
        SigningError::IoError(format!("Failed to read {}: {e}", path.display()))
    })?;
    log::debug!("Loaded {} ({} bytes)", path.display(), data.len());
    Ok(data)
}

/// Write `data` to `path`, creating or truncating it.
pub fn save_file(path: &Path, data: &[u8]) -> SigningResult<()> {
    fs::write(path, data).map_err(|e| {
        SigningError::IoError(format!("Failed to write {}: {e}", path.display()))
    })?;
    log::debug!("Saved {} ({} bytes)", path.display(), data.len());
    Ok(())
}
