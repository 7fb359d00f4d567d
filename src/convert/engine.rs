//! The external rendering engine.
//!
//! [`MarkmapEngine`] drives the `markmap` CLI. It is always invoked with an
//! argument vector, never through a shell, so paths and filenames reach the
//! engine verbatim whatever characters they contain.

use std::ffi::OsString;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::error::{ConvertError, ConvertResult};
use crate::config::EngineConfig;

/// Inputs for a single engine run.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    /// Markdown file to read.
    pub input: &'a Path,
    /// HTML file to produce.
    pub output: &'a Path,
    /// Whether the generated page shows the markmap toolbar.
    pub toolbar: bool,
}

/// Something that turns a markdown file into an HTML mind map.
pub trait RenderEngine {
    /// Renders `job.input` into `job.output`, returning once the engine has
    /// finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be started, exits
    /// unsuccessfully, or exceeds its time limit.
    fn render(&self, job: &RenderJob<'_>) -> impl Future<Output = ConvertResult<()>> + Send;
}

/// Renders mind maps by running the `markmap` command-line tool.
#[derive(Debug, Clone)]
pub struct MarkmapEngine {
    program: String,
    prefix_args: Vec<String>,
    timeout: Option<Duration>,
}

impl MarkmapEngine {
    /// Creates an engine running `program` with no time limit.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            timeout: None,
        }
    }

    /// Creates an engine from the `engine` section of the configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.command.clone())
            .with_prefix_args(config.args.clone())
            .with_timeout(config.timeout())
    }

    /// Arguments passed ahead of the conversion flags.
    #[must_use]
    pub fn with_prefix_args(mut self, args: Vec<String>) -> Self {
        self.prefix_args = args;
        self
    }

    /// Kills the engine if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the full argument vector for `job`.
    #[must_use]
    pub fn arguments(&self, job: &RenderJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.prefix_args.iter().map(OsString::from).collect();
        args.push("--offline".into());
        args.push("--no-open".into());
        if !job.toolbar {
            args.push("--no-toolbar".into());
        }
        args.push("-o".into());
        args.push(job.output.as_os_str().to_owned());
        args.push(job.input.as_os_str().to_owned());
        args
    }
}

impl Default for MarkmapEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RenderEngine for MarkmapEngine {
    async fn render(&self, job: &RenderJob<'_>) -> ConvertResult<()> {
        let args = self.arguments(job);
        tracing::debug!(program = %self.program, args = ?args, "Running rendering engine");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    tracing::warn!(
                        program = %self.program,
                        timeout_secs = limit.as_secs(),
                        "Rendering engine timed out"
                    );
                    ConvertError::Timeout {
                        program: self.program.clone(),
                        timeout: limit,
                    }
                })?,
            None => command.output().await,
        }
        .map_err(|source| ConvertError::Launch {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let diagnostics = diagnostics(&output.stderr, &output.stdout);
            tracing::warn!(
                program = %self.program,
                status = %output.status,
                diagnostics = %diagnostics,
                "Rendering engine failed"
            );
            return Err(ConvertError::EngineFailed {
                program: self.program.clone(),
                status: output.status,
                diagnostics,
            });
        }

        Ok(())
    }
}

/// Picks the most useful diagnostic text from an engine run.
fn diagnostics(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    let stdout = String::from_utf8_lossy(stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }
    "no diagnostic output".to_string()
}
