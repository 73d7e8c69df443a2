use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::mcp::registry::CapabilityHost;

use super::{Method, Toolset, ToolsetError};

/// Snapshot of a toolset for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolsetSummary {
    pub method: Method,
    pub description: String,
    pub enabled: bool,
    pub read_only: bool,
    pub tools: Vec<String>,
}

/// A set of toolsets keyed by method.
#[derive(Debug, Default)]
pub struct ToolsetGroup {
    toolsets: BTreeMap<Method, Toolset>,
    everything_on: bool,
    read_only: bool,
}

impl ToolsetGroup {
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: BTreeMap::new(),
            everything_on: false,
            read_only,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Add or replace the toolset stored under its method.
    pub fn add_toolset(&mut self, mut toolset: Toolset) {
        if self.read_only {
            toolset.set_read_only();
        }
        if self.everything_on {
            toolset.set_enabled(true);
        }
        self.toolsets.insert(toolset.method().clone(), toolset);
    }

    pub fn is_enabled(&self, method: &Method) -> bool {
        if self.everything_on {
            return true;
        }
        self.toolsets
            .get(method)
            .map(Toolset::is_enabled)
            .unwrap_or(false)
    }

    /// Enable each named toolset in order.
    ///
    /// When `all` appears anywhere in `methods` every toolset is enabled and
    /// the other names are not checked. Otherwise the first unknown name stops
    /// the scan; toolsets enabled before it stay enabled.
    pub fn enable_toolsets(&mut self, methods: &[Method]) -> Result<(), ToolsetError> {
        if methods.iter().any(Method::is_all) {
            self.everything_on = true;
            for toolset in self.toolsets.values_mut() {
                toolset.set_enabled(true);
            }
            debug!("Enabled all {} toolsets", self.toolsets.len());
            return Ok(());
        }

        for method in methods {
            self.enable_toolset(method)?;
        }
        Ok(())
    }

    pub fn enable_toolset(&mut self, method: &Method) -> Result<(), ToolsetError> {
        let toolset = self
            .toolsets
            .get_mut(method)
            .ok_or_else(|| ToolsetError::DoesNotExist(method.clone()))?;
        toolset.set_enabled(true);
        debug!("Enabled toolset {}", method);
        Ok(())
    }

    pub fn toolset(&self, method: &Method) -> Result<&Toolset, ToolsetError> {
        self.toolsets
            .get(method)
            .ok_or_else(|| ToolsetError::DoesNotExist(method.clone()))
    }

    /// Toolsets in method order.
    pub fn toolsets(&self) -> impl Iterator<Item = &Toolset> {
        self.toolsets.values()
    }

    /// True when an enabled toolset offers at least one tool.
    pub fn has_tools(&self) -> bool {
        self.toolsets
            .values()
            .any(|toolset| toolset.is_enabled() && !toolset.available_tools().is_empty())
    }

    /// Publish the tools, resource templates and prompts of every enabled toolset.
    pub fn register_all<H: CapabilityHost + ?Sized>(&self, host: &mut H) {
        for toolset in self.toolsets.values() {
            toolset.register_tools(host);
            toolset.register_resource_templates(host);
            toolset.register_prompts(host);
        }
    }

    pub fn summaries(&self) -> Vec<ToolsetSummary> {
        self.toolsets
            .values()
            .map(|toolset| ToolsetSummary {
                method: toolset.method().clone(),
                description: toolset.description().to_string(),
                enabled: toolset.is_enabled(),
                read_only: toolset.is_read_only(),
                tools: toolset
                    .available_tools()
                    .into_iter()
                    .map(|tool| tool.name.clone())
                    .collect(),
            })
            .collect()
    }
}
