use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::foundation::error::{FlowError, FlowResult};

/// Filesystem capability used by the orchestrator.
///
/// Implementations must be shareable across threads; the orchestrator holds one behind an `Arc`.
pub trait ArtifactStore: Send + Sync {
    /// Create `dir` and any missing parents.
    fn ensure_dir(&self, dir: &Path) -> FlowResult<()>;
    /// Open a fresh, truncated stream at `path` for the encoder to write into.
    fn create(&self, path: &Path) -> FlowResult<Box<dyn Write + Send>>;
    fn read(&self, path: &Path) -> FlowResult<Vec<u8>>;
    /// Replace `path` with `bytes`. Readers never observe a partially written file.
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> FlowResult<()>;
    /// Remove `path`. A file that is already gone is not an error.
    fn remove_file(&self, path: &Path) -> FlowResult<()>;
}

/// [`ArtifactStore`] over the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

impl ArtifactStore for LocalStore {
    fn ensure_dir(&self, dir: &Path) -> FlowResult<()> {
        fs::create_dir_all(dir).map_err(|e| {
            FlowError::io(format!("failed to create directory '{}': {e}", dir.display()))
        })
    }

    fn create(&self, path: &Path) -> FlowResult<Box<dyn Write + Send>> {
        let file = fs::File::create(path)
            .map_err(|e| FlowError::io(format!("failed to create '{}': {e}", path.display())))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn read(&self, path: &Path) -> FlowResult<Vec<u8>> {
        fs::read(path)
            .map_err(|e| FlowError::io(format!("failed to read '{}': {e}", path.display())))
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> FlowResult<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            FlowError::io(format!("failed to stage write in '{}': {e}", dir.display()))
        })?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| FlowError::io(format!("failed to write '{}': {e}", path.display())))?;
        tmp.persist(path).map_err(|e| {
            FlowError::io(format!("failed to publish '{}': {}", path.display(), e.error))
        })?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> FlowResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FlowError::io(format!(
                "failed to remove '{}': {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/store.rs"]
mod tests;
