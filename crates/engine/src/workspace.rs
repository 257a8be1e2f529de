//! The shared scratch workspace for one regeneration run

use relock_core::{Error, Result};
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// Scratch root shared by every per-version unit of one run.
///
/// Owned by the orchestrator for the lifetime of the run. Each unit gets an
/// exclusively-owned subdirectory beneath the root; the root itself is never
/// mutated after creation. `release` removes the whole tree; if a run errors
/// out before reaching it, dropping the value removes the tree instead, so
/// no scratch state outlives the process on any exit path.
#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    /// Create a fresh, uniquely named scratch directory.
    pub fn acquire() -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("relock-")
            .tempdir()
            .map_err(|e| Error::io(e, None, "create scratch workspace"))?;
        debug!(path = %root.path().display(), "Acquired scratch workspace");
        Ok(Self { root })
    }

    /// The workspace root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Remove the workspace and everything beneath it.
    ///
    /// Must only be called once every unit has terminated; the orchestrator
    /// joins all units before releasing.
    pub fn release(self) -> Result<()> {
        let path = self.root.path().to_path_buf();
        debug!(path = %path.display(), "Releasing scratch workspace");
        self.root
            .close()
            .map_err(|e| Error::io(e, Some(path), "remove scratch workspace"))
    }
}
