use std::io;
use std::path::Path;

use crate::domain::AppError;

fn launch_error(path: &Path, error: io::Error) -> AppError {
    AppError::Io(format!("Failed to open {}: {}", path.display(), error))
}

/// Shows `path` in the platform file manager. The launcher runs detached,
/// so nothing is left to reap and the UI never waits on it.
pub fn open_folder(path: &Path) -> Result<(), AppError> {
    tracing::info!(path = %path.display(), "opening download folder");
    open::that_detached(path).map_err(|e| launch_error(path, e))
}
