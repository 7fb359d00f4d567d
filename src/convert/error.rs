//! Error types for markdown conversion.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while turning markdown into a mind map.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The temporary workspace could not be created.
    #[error("failed to create temporary workspace: {source}")]
    Workspace {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The markdown input could not be written into the workspace.
    #[error("failed to write markdown to {path}: {source}")]
    WriteInput {
        /// Path of the input file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The rendering engine could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        /// Program that was executed.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The rendering engine exited unsuccessfully.
    #[error("{program} failed ({status}): {diagnostics}")]
    EngineFailed {
        /// Program that was executed.
        program: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// What the engine printed on stderr (or stdout if stderr was empty).
        diagnostics: String,
    },

    /// The rendering engine did not finish in time and was killed.
    #[error("{program} did not finish within {}s", timeout.as_secs())]
    Timeout {
        /// Program that was executed.
        program: String,
        /// The limit that was exceeded.
        timeout: Duration,
    },

    /// The engine reported success but produced no output file.
    #[error("rendering engine produced no output at {path}")]
    MissingArtifact {
        /// Where the artifact was expected.
        path: PathBuf,
    },

    /// The generated HTML could not be read back.
    #[error("failed to read generated mind map {path}: {source}")]
    ReadArtifact {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_names_limit() {
        let err = ConvertError::Timeout {
            program: "markmap".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "markmap did not finish within 5s");
    }

    #[test]
    fn launch_display_includes_system_message() {
        let err = ConvertError::Launch {
            program: "markmap".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        let msg = err.to_string();
        assert!(msg.contains("markmap"));
        assert!(msg.contains("No such file or directory"));
    }
}
