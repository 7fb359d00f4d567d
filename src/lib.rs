//! mindmap-converter-mcp: MCP server that turns markdown into mind maps
//!
//! This library exposes two MCP tools that hand markdown to the `markmap`
//! command-line tool and return the interactive HTML mind map it produces,
//! either inline or saved to an output directory.
//!
//! # Architecture
//!
//! The server owns the request lifecycle; the rendering itself is delegated:
//!
//! - **Conversion**: Per-call temporary workspace, engine invocation, cleanup
//! - **Tool Catalog**: Tool names and input schemas for discovery
//! - **Dispatch**: Argument validation, output-path resolution, responses
//!
//! Markdown parsing, layout and HTML generation are entirely the engine's job.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`convert`] — Workspace management and the rendering engine
//! - [`error`] — Configuration error types
//! - [`mcp`] — MCP protocol implementation

pub mod config;
pub mod convert;
pub mod error;
pub mod mcp;
