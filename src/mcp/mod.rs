//! MCP (Model Context Protocol) capability host
//!
//! Stores the tools, resource templates and prompts published by the enabled
//! toolsets and answers JSON-RPC calls against them.
//!
//! ## Architecture
//!
//! - Transport: one JSON-RPC message per `POST /`, no sessions or streaming
//! - Auth: the HTTP auth middleware attaches a `SecurityContext`; only the
//!   bypass methods run without one
//! - Tools: filtered per caller by a scope prefix table

pub mod context;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod scope_filter;
pub mod tools;

pub use handler::{create_mcp_state, mcp_handler, McpState};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::{CapabilityHost, McpRegistry};
pub use scope_filter::{ScopeFilter, ScopeRule};
