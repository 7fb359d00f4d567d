//! Markdown to mind map conversion.
//!
//! A conversion runs in its own [`Workspace`]: the markdown is written to a
//! file there, the [`RenderEngine`] turns it into HTML, and the caller gets
//! back a [`ConversionResult`] holding the artifact path together with the
//! workspace. The caller decides when the workspace goes away, because an
//! inline artifact still has to be read out of it.
//!
//! ```text
//!  markdown ──▶ input.md ──▶ engine ──▶ output.html  (ephemeral)
//!                                  └──▶ <destination> (persisted)
//! ```

mod engine;
mod error;
mod workspace;

pub use engine::{MarkmapEngine, RenderEngine, RenderJob};
pub use error::{ConvertError, ConvertResult};
pub use workspace::{Workspace, WORKSPACE_PREFIX};

use std::path::{Path, PathBuf};

/// Runs conversions against a rendering engine.
#[derive(Debug)]
pub struct Converter<E> {
    engine: E,
    workspace_root: Option<PathBuf>,
}

impl<E: RenderEngine> Converter<E> {
    /// Creates a converter whose workspaces live in the OS temp dir.
    #[must_use]
    pub const fn new(engine: E) -> Self {
        Self {
            engine,
            workspace_root: None,
        }
    }

    /// Places workspaces under `root` instead of the OS temp dir.
    #[must_use]
    pub fn with_workspace_root(mut self, root: Option<PathBuf>) -> Self {
        self.workspace_root = root;
        self
    }

    /// Returns the underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Converts `markdown` into an HTML mind map.
    ///
    /// The artifact is written to `destination` when given, otherwise into
    /// the workspace. On failure the workspace has already been removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace cannot be prepared, the engine
    /// fails, or no artifact was produced.
    pub async fn convert(
        &self,
        markdown: &str,
        toolbar: bool,
        destination: Option<&Path>,
    ) -> ConvertResult<ConversionResult> {
        let workspace = Workspace::create(self.workspace_root.as_deref())?;

        match self.run(&workspace, markdown, toolbar, destination).await {
            Ok(artifact_path) => Ok(ConversionResult {
                artifact_path,
                workspace,
            }),
            Err(e) => {
                workspace.close();
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        workspace: &Workspace,
        markdown: &str,
        toolbar: bool,
        destination: Option<&Path>,
    ) -> ConvertResult<PathBuf> {
        let input = workspace.input_path();
        tokio::fs::write(&input, markdown)
            .await
            .map_err(|source| ConvertError::WriteInput {
                path: input.clone(),
                source,
            })?;

        let output = destination.map_or_else(|| workspace.output_path(), Path::to_path_buf);

        self.engine
            .render(&RenderJob {
                input: &input,
                output: &output,
                toolbar,
            })
            .await?;

        match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.is_file() => Ok(output),
            _ => Err(ConvertError::MissingArtifact { path: output }),
        }
    }
}

/// A finished conversion whose workspace has not been cleaned up yet.
#[derive(Debug)]
#[must_use = "dropping a ConversionResult discards the artifact location"]
pub struct ConversionResult {
    artifact_path: PathBuf,
    workspace: Workspace,
}

impl ConversionResult {
    /// Where the engine wrote the HTML.
    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// The workspace backing this conversion.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Reads the artifact into memory, then removes the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ReadArtifact`] if the file cannot be read. The
    /// workspace is removed either way.
    pub async fn read_artifact(self) -> ConvertResult<String> {
        let read = tokio::fs::read_to_string(&self.artifact_path).await;
        self.workspace.close();
        read.map_err(|source| ConvertError::ReadArtifact {
            path: self.artifact_path,
            source,
        })
    }

    /// Removes the workspace and returns the artifact path.
    ///
    /// Only meaningful for persisted artifacts; an ephemeral artifact goes
    /// away with its workspace.
    #[must_use]
    pub fn persist(self) -> PathBuf {
        self.workspace.close();
        self.artifact_path
    }
}
