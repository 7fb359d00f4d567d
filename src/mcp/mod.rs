//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes markdown to mind map conversion as two MCP tools. The server
//! communicates over stdio using newline-delimited JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│  Dispatcher  │     │
//! │   │   (stdio)   │    │ (lifecycle) │    │ (tools/call) │     │
//! │   └─────────────┘    └─────────────┘    └──────────────┘     │
//! │                             │                   │            │
//! │                             ▼                   ▼            │
//! │                      ┌─────────────┐    ┌──────────────┐     │
//! │                      │    Tools    │    │  Converter   │     │
//! │                      │  (catalog)  │    │ (markmap CLI)│     │
//! │                      └─────────────┘    └──────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod dispatch;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use dispatch::{Dispatcher, OutputSettings, ToolCallResult, ToolError};
pub use protocol::{JsonRpcError, JsonRpcResponse, OutgoingMessage, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::StdioTransport;
