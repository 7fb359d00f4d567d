//! Per-conversion temporary workspace.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::error::{ConvertError, ConvertResult};

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "mindmap-";

const INPUT_FILE: &str = "input.md";
const OUTPUT_FILE: &str = "output.html";

/// A uniquely-named temporary directory backing one conversion.
///
/// The directory is removed exactly once: by [`Workspace::close`], or on drop
/// if the workspace is abandoned. Files written elsewhere (a persisted
/// artifact) are never touched.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a new workspace under `root`, or the OS temp dir if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Workspace`] if the directory cannot be created.
    pub fn create(root: Option<&Path>) -> ConvertResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| ConvertError::Workspace { source })?;

        tracing::debug!(path = %dir.path().display(), "Created workspace");
        Ok(Self { dir })
    }

    /// Returns the workspace directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path the markdown input is written to.
    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join(INPUT_FILE)
    }

    /// Path of the ephemeral HTML artifact.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_FILE)
    }

    /// Removes the workspace directory and everything in it.
    ///
    /// A failure is logged rather than returned; it must never mask the
    /// outcome of the conversion itself.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed workspace"),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove workspace"
            ),
        }
    }
}
