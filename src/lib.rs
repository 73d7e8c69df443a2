//! Toolset Server Library
//!
//! Named, toggleable toolsets served over a JSON-RPC capability host behind
//! bearer authentication.

pub mod auth;
pub mod config;
pub mod mcp;
pub mod server;
pub mod toolsets;

// Re-export commonly used types for convenience
pub use auth::{BearerAuthenticator, IdentityClient, SecurityContext};
pub use server::{run_server, RequestsLoggingLevel};
pub use toolsets::{Method, MethodRegistry, Toolset, ToolsetGroup};
