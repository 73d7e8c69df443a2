//! MCP Tool Execution Context
//!
//! Provides request identity and server metadata to tool, resource and prompt handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::SecurityContext;
use crate::toolsets::ToolsetSummary;

/// Static facts about the running server, captured once toolsets are enabled.
#[derive(Debug, Clone)]
pub struct ServerMetadata {
    pub name: String,
    pub version: String,
    pub read_only: bool,
    pub deployment_region: String,
    pub toolsets: Vec<ToolsetSummary>,
    pub start_time: Instant,
}

impl ServerMetadata {
    pub fn new(read_only: bool, deployment_region: impl Into<String>) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            read_only,
            deployment_region: deployment_region.into(),
            toolsets: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn with_toolsets(mut self, toolsets: Vec<ToolsetSummary>) -> Self {
        self.toolsets = toolsets;
        self
    }
}

/// Context provided to handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Identity attached by the auth middleware. `None` only for whitelisted methods.
    pub security: Option<SecurityContext>,

    pub server: Arc<ServerMetadata>,
}

impl ToolContext {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.security
            .as_ref()
            .map(|security| security.has_scope(scope))
            .unwrap_or(false)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.security.as_ref().map(|security| security.user_id)
    }
}
