//! The tool catalog advertised through `tools/list`.

use serde::Serialize;
use serde_json::{json, Value};

/// Tool that returns the generated HTML inline.
pub const CONTENT_TOOL: &str = "markdown-to-mindmap-content";

/// Tool that writes the generated HTML to the output directory.
pub const FILE_TOOL: &str = "markdown-to-mindmap-file";

/// A tool definition for the tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Returns every tool this server exposes.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CONTENT_TOOL,
            description: "Convert markdown to an interactive mind map and return the HTML content",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "markdown": markdown_property(),
                    "toolbar": toolbar_property()
                },
                "required": ["markdown"]
            }),
        },
        ToolDefinition {
            name: FILE_TOOL,
            description: "Convert markdown to an interactive mind map and save to a file",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "markdown": markdown_property(),
                    "filename": {
                        "type": "string",
                        "description": "Filename for the HTML file (default: auto-generated name)"
                    },
                    "toolbar": toolbar_property()
                },
                "required": ["markdown"]
            }),
        },
    ]
}

fn markdown_property() -> Value {
    json!({
        "type": "string",
        "description": "Markdown content to convert to mind map"
    })
}

fn toolbar_property() -> Value {
    json!({
        "type": "boolean",
        "description": "Whether to show the toolbar in the generated map (default: true)"
    })
}
