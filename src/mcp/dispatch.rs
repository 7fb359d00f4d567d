//! Routing and handling of `tools/call` requests.
//!
//! Each call moves through the same stages: its arguments are deserialised
//! into the tool's argument type, the conversion runs, the artifact is
//! either read back or left in the output directory, and the outcome is
//! shaped into a [`ToolCallResult`]. Every failure, at any stage, ends up in
//! [`error_result`]; nothing escapes to the transport as a protocol error.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::OutputConfig;
use crate::convert::{ConvertError, Converter, RenderEngine};
use crate::mcp::tools::{CONTENT_TOOL, FILE_TOOL};

/// Parameters for a tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Returns the text of the first content item.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            ToolContent::Text { text } => text.as_str(),
        })
    }
}

/// Everything that can go wrong while handling a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments do not match the tool's schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The output directory is missing or cannot be written to.
    #[error(
        "The output directory {} does not exist or is not writable. \
         Make sure you've properly mounted a volume to the container.",
        path.display()
    )]
    OutputDirUnavailable {
        /// The configured output directory.
        path: PathBuf,
        /// Why the directory was rejected.
        #[source]
        source: io::Error,
    },

    /// Conversion failed.
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// No tool with this name is registered.
    #[error("Tool not found: {0}")]
    UnknownTool(String),
}

/// The tools this server dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Return the HTML inline.
    Content,
    /// Persist the HTML to the output directory.
    File,
}

impl Tool {
    /// Looks up a tool by its registered name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            CONTENT_TOOL => Some(Self::Content),
            FILE_TOOL => Some(Self::File),
            _ => None,
        }
    }

    /// Returns the registered name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Content => CONTENT_TOOL,
            Self::File => FILE_TOOL,
        }
    }

    const fn failure_prefix(self) -> &'static str {
        match self {
            Self::Content => "Error converting markdown to mindmap",
            Self::File => "Error saving markdown to mindmap file",
        }
    }
}

/// Turns any tool failure into the response envelope sent to the client.
#[must_use]
pub fn error_result(tool: Option<Tool>, error: &ToolError) -> ToolCallResult {
    let message = match (tool, error) {
        (_, ToolError::UnknownTool(_)) | (None, _) => error.to_string(),
        (Some(_), ToolError::OutputDirUnavailable { .. }) => format!("Error: {error}"),
        (Some(tool), _) => format!("{}: {error}", tool.failure_prefix()),
    };
    ToolCallResult::error(message)
}

/// Arguments of `markdown-to-mindmap-content`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentArgs {
    /// Markdown source. May be empty.
    pub markdown: String,
    /// Show the toolbar; absent or `null` means yes.
    #[serde(default)]
    pub toolbar: Option<bool>,
}

/// Arguments of `markdown-to-mindmap-file`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileArgs {
    /// Markdown source. May be empty.
    pub markdown: String,
    /// Name of the file to write; generated when absent or empty.
    #[serde(default)]
    pub filename: Option<String>,
    /// Show the toolbar; absent or `null` means yes.
    #[serde(default)]
    pub toolbar: Option<bool>,
}

fn parse_arguments<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    T::deserialize(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Returns the name a persisted mind map gets when the caller names none.
///
/// The timestamp is ISO-8601 UTC with millisecond precision; `:` and `.` are
/// replaced by `-` so the name is safe on every filesystem. Two calls in the
/// same millisecond produce the same name.
#[must_use]
pub fn generated_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("mindmap-{stamp}.html")
}

/// Accepts only a single plain file name.
fn validate_filename(name: &str) -> Result<(), ToolError> {
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(ToolError::InvalidArguments(format!(
            "filename must be a plain file name, got '{name}'"
        )));
    }
    Ok(())
}

/// Where the file tool writes, and how that location is described to users.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Directory persisted mind maps are written to.
    pub dir: PathBuf,
    /// Directory named in the confirmation as the host-side location.
    pub host_dir: Option<PathBuf>,
}

impl OutputSettings {
    /// Creates settings from the `output` section of the configuration.
    #[must_use]
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            host_dir: config.host_dir.clone(),
        }
    }

    /// Checks that the output directory exists and accepts new files.
    ///
    /// Returns the directory as an absolute path.
    fn ensure_writable(&self) -> Result<PathBuf, ToolError> {
        let unavailable = |source| ToolError::OutputDirUnavailable {
            path: self.dir.clone(),
            source,
        };

        let meta = std::fs::metadata(&self.dir).map_err(unavailable)?;
        if !meta.is_dir() {
            return Err(unavailable(io::Error::other("not a directory")));
        }

        // Permission bits lie for root and ACLs; creating a file does not.
        tempfile::Builder::new()
            .prefix(".mindmap-write-check-")
            .tempfile_in(&self.dir)
            .map_err(unavailable)?;

        self.dir.canonicalize().map_err(unavailable)
    }

    fn display_path(&self, filename: &str) -> PathBuf {
        self.host_dir.as_ref().unwrap_or(&self.dir).join(filename)
    }
}

/// Routes tool calls to their handlers.
#[derive(Debug)]
pub struct Dispatcher<E> {
    converter: Converter<E>,
    output: OutputSettings,
}

impl<E: RenderEngine> Dispatcher<E> {
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(converter: Converter<E>, output: OutputSettings) -> Self {
        Self { converter, output }
    }

    /// Returns the converter used for every call.
    #[must_use]
    pub const fn converter(&self) -> &Converter<E> {
        &self.converter
    }

    /// Handles one tool call. Always produces a response envelope.
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolCallResult {
        let Some(tool) = Tool::from_name(name) else {
            tracing::warn!(tool = %name, "Unknown tool requested");
            return error_result(None, &ToolError::UnknownTool(name.to_string()));
        };

        tracing::info!(tool = tool.name(), "Handling tool call");

        let outcome = match tool {
            Tool::Content => self.call_content(arguments).await,
            Tool::File => self.call_file(arguments).await,
        };

        match outcome {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                tracing::error!(tool = tool.name(), error = %e, "Tool call failed");
                error_result(Some(tool), &e)
            }
        }
    }

    async fn call_content(&self, arguments: &Value) -> Result<String, ToolError> {
        let args: ContentArgs = parse_arguments(arguments)?;

        let result = self
            .converter
            .convert(&args.markdown, args.toolbar.unwrap_or(true), None)
            .await?;
        let html = result.read_artifact().await?;

        tracing::debug!(bytes = html.len(), "Returning mind map inline");
        Ok(html)
    }

    async fn call_file(&self, arguments: &Value) -> Result<String, ToolError> {
        let args: FileArgs = parse_arguments(arguments)?;

        let filename = match args.filename.filter(|f| !f.is_empty()) {
            Some(name) => {
                validate_filename(&name)?;
                name
            }
            None => generated_filename(Utc::now()),
        };

        let dir = self.output.ensure_writable()?;
        let destination = dir.join(&filename);

        let result = self
            .converter
            .convert(
                &args.markdown,
                args.toolbar.unwrap_or(true),
                Some(&destination),
            )
            .await?;
        let saved = result.persist();

        tracing::info!(path = %saved.display(), "Mind map saved");
        Ok(confirmation(&saved, &self.output.display_path(&filename)))
    }
}

fn confirmation(saved: &Path, display: &Path) -> String {
    format!(
        "Mind map has been saved to: {}\n\n\
         On your host system, this file is available at: {}\n\n\
         You can open this file in any web browser to view the interactive mind map.",
        saved.display(),
        display.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn generated_filename_replaces_separators() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(
            generated_filename(now),
            "mindmap-2026-10-19T08-05-03-042Z.html"
        );
    }

    #[test]
    fn tool_lookup() {
        assert_eq!(Tool::from_name(CONTENT_TOOL), Some(Tool::Content));
        assert_eq!(Tool::from_name(FILE_TOOL), Some(Tool::File));
        assert_eq!(Tool::from_name("frobnicate"), None);
        assert_eq!(Tool::File.name(), FILE_TOOL);
    }

    #[test]
    fn content_args_default_toolbar() {
        let args: ContentArgs = parse_arguments(&json!({"markdown": "# A"})).unwrap();
        assert_eq!(args.toolbar, None);
        let args: ContentArgs =
            parse_arguments(&json!({"markdown": "", "toolbar": false})).unwrap();
        assert_eq!(args.toolbar, Some(false));
    }

    #[test]
    fn missing_markdown_is_rejected() {
        let err = parse_arguments::<ContentArgs>(&json!({"toolbar": true})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(ref m) if m.contains("markdown")));
        assert!(parse_arguments::<FileArgs>(&Value::Null).is_err());
    }

    #[test]
    fn mistyped_arguments_are_rejected() {
        assert!(parse_arguments::<ContentArgs>(&json!({"markdown": 3})).is_err());
        assert!(parse_arguments::<ContentArgs>(&json!({"markdown": "x", "toolbar": "no"})).is_err());
        assert!(parse_arguments::<FileArgs>(&json!({"markdown": "x", "filename": 1})).is_err());
    }

    #[test]
    fn filename_must_be_plain() {
        assert!(validate_filename("map.html").is_ok());
        assert!(validate_filename("my map (1).html").is_ok());
        assert!(validate_filename("../escape.html").is_err());
        assert!(validate_filename("sub/dir.html").is_err());
        assert!(validate_filename("..").is_err());
        assert!(validate_filename("a\\b.html").is_err());
    }

    #[test]
    fn error_messages_carry_tool_prefix() {
        let err = ToolError::InvalidArguments("missing field `markdown`".to_string());
        let content = error_result(Some(Tool::Content), &err);
        assert!(content.is_error);
        assert_eq!(
            content.first_text(),
            Some("Error converting markdown to mindmap: Invalid arguments: missing field `markdown`")
        );

        let file = error_result(Some(Tool::File), &err);
        assert!(file
            .first_text()
            .unwrap()
            .starts_with("Error saving markdown to mindmap file: "));
    }

    #[test]
    fn output_dir_error_names_the_directory() {
        let err = ToolError::OutputDirUnavailable {
            path: PathBuf::from("/output"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let result = error_result(Some(Tool::File), &err);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Error: The output directory /output does not exist"));
        assert!(text.contains("mounted a volume"));
    }

    #[test]
    fn unknown_tool_message() {
        let result = error_result(None, &ToolError::UnknownTool("frobnicate".to_string()));
        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Tool not found: frobnicate"));
    }

    #[test]
    fn ensure_writable_rejects_missing_and_files() {
        let root = tempfile::tempdir().unwrap();
        let missing = OutputSettings {
            dir: root.path().join("missing"),
            host_dir: None,
        };
        assert!(matches!(
            missing.ensure_writable(),
            Err(ToolError::OutputDirUnavailable { .. })
        ));

        let file = root.path().join("plain-file");
        std::fs::write(&file, "").unwrap();
        let not_dir = OutputSettings {
            dir: file,
            host_dir: None,
        };
        assert!(not_dir.ensure_writable().is_err());

        let ok = OutputSettings {
            dir: root.path().to_path_buf(),
            host_dir: None,
        };
        assert!(ok.ensure_writable().unwrap().is_absolute());
        // The write check leaves nothing behind.
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn display_path_prefers_host_dir() {
        let settings = OutputSettings {
            dir: PathBuf::from("/output"),
            host_dir: Some(PathBuf::from("/Users/me/Downloads")),
        };
        assert_eq!(
            settings.display_path("a.html"),
            PathBuf::from("/Users/me/Downloads/a.html")
        );

        let settings = OutputSettings {
            dir: PathBuf::from("/output"),
            host_dir: None,
        };
        assert_eq!(settings.display_path("a.html"), PathBuf::from("/output/a.html"));
    }

    #[test]
    fn tool_call_result_serialises_is_error() {
        let json = serde_json::to_value(ToolCallResult::text("<html></html>")).unwrap();
        assert_eq!(
            json,
            json!({"content": [{"type": "text", "text": "<html></html>"}], "isError": false})
        );
    }
}
