//! MCP Capability Registry
//!
//! Manages registration and lookup of tools, resource templates and prompts.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::context::ToolContext;
use super::protocol::{
    McpError, PromptArgument, PromptDefinition, PromptsGetResult, ResourceContent,
    ResourceTemplateDefinition, ToolAnnotations, ToolDefinition, ToolsCallResult,
};
use super::scope_filter::ScopeFilter;

// ============================================================================
// Tool Types
// ============================================================================

/// Result type for tool execution
pub type ToolResult = Result<ToolsCallResult, McpError>;

/// Boxed future for async tool execution
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Tool handler function type
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

/// A tool definition paired with its handler
#[derive(Clone)]
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub annotations: ToolAnnotations,
    pub handler: ToolHandler,
}

impl RegisteredTool {
    pub fn is_read_only(&self) -> bool {
        self.annotations.read_only_hint
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Resource Template Types
// ============================================================================

/// Result type for resource read
pub type ResourceResult = Result<Vec<ResourceContent>, McpError>;

/// Boxed future for async resource read
pub type ResourceFuture = Pin<Box<dyn Future<Output = ResourceResult> + Send>>;

/// Resource handler function type
pub type ResourceHandler = Arc<dyn Fn(ToolContext, String) -> ResourceFuture + Send + Sync>;

/// A resource template with metadata and handler
#[derive(Clone)]
pub struct RegisteredResourceTemplate {
    pub uri_template: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub handler: ResourceHandler,
}

impl RegisteredResourceTemplate {
    pub fn definition(&self) -> ResourceTemplateDefinition {
        ResourceTemplateDefinition {
            uri_template: self.uri_template.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl std::fmt::Debug for RegisteredResourceTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredResourceTemplate")
            .field("uri_template", &self.uri_template)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Prompt Types
// ============================================================================

pub type PromptResult = Result<PromptsGetResult, McpError>;

pub type PromptFuture = Pin<Box<dyn Future<Output = PromptResult> + Send>>;

pub type PromptHandler =
    Arc<dyn Fn(ToolContext, HashMap<String, String>) -> PromptFuture + Send + Sync>;

/// A prompt with its declared arguments and handler
#[derive(Clone)]
pub struct RegisteredPrompt {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<PromptArgument>,
    pub handler: PromptHandler,
}

impl RegisteredPrompt {
    pub fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
        }
    }

    /// Fails with the first declared-required argument that is absent.
    pub fn check_arguments(&self, arguments: &HashMap<String, String>) -> Result<(), McpError> {
        match self
            .arguments
            .iter()
            .find(|arg| arg.required && !arguments.contains_key(&arg.name))
        {
            Some(missing) => Err(McpError::InvalidParams(format!(
                "missing required argument: {}",
                missing.name
            ))),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RegisteredPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPrompt")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Capability Host
// ============================================================================

/// The three registration entry points toolsets publish their capabilities through.
pub trait CapabilityHost {
    fn register_tool(&mut self, tool: RegisteredTool);
    fn register_resource_template(&mut self, template: RegisteredResourceTemplate);
    fn register_prompt(&mut self, prompt: RegisteredPrompt);
}

// ============================================================================
// Registry
// ============================================================================

/// Registry for MCP tools, resource templates and prompts.
///
/// Listing order follows registration order. Registering a second capability
/// with an existing name replaces the first.
#[derive(Default)]
pub struct McpRegistry {
    tools: Vec<RegisteredTool>,
    resource_templates: Vec<RegisteredResourceTemplate>,
    prompts: Vec<RegisteredPrompt>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tools visible to a caller holding `scopes`
    pub fn list_tools(&self, scopes: &[String], filter: &ScopeFilter) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .filter(|tool| filter.allows(&tool.name, scopes))
            .map(RegisteredTool::definition)
            .collect()
    }

    /// Get a tool by name, honoring the scope filter
    pub fn get_tool(
        &self,
        name: &str,
        scopes: &[String],
        filter: &ScopeFilter,
    ) -> Option<&RegisteredTool> {
        self.tools
            .iter()
            .find(|tool| tool.name == name)
            .filter(|tool| filter.allows(&tool.name, scopes))
    }

    pub fn list_resource_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.resource_templates
            .iter()
            .map(RegisteredResourceTemplate::definition)
            .collect()
    }

    /// Find the first resource template matching a URI
    pub fn find_resource_template(&self, uri: &str) -> Option<&RegisteredResourceTemplate> {
        self.resource_templates
            .iter()
            .find(|template| matches_uri_pattern(&template.uri_template, uri))
    }

    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.prompts
            .iter()
            .map(RegisteredPrompt::definition)
            .collect()
    }

    pub fn get_prompt(&self, name: &str) -> Option<&RegisteredPrompt> {
        self.prompts.iter().find(|prompt| prompt.name == name)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn resource_template_count(&self) -> usize {
        self.resource_templates.len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }
}

impl CapabilityHost for McpRegistry {
    fn register_tool(&mut self, tool: RegisteredTool) {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    fn register_resource_template(&mut self, template: RegisteredResourceTemplate) {
        match self
            .resource_templates
            .iter_mut()
            .find(|t| t.uri_template == template.uri_template)
        {
            Some(existing) => *existing = template,
            None => self.resource_templates.push(template),
        }
    }

    fn register_prompt(&mut self, prompt: RegisteredPrompt) {
        match self.prompts.iter_mut().find(|p| p.name == prompt.name) {
            Some(existing) => *existing = prompt,
            None => self.prompts.push(prompt),
        }
    }
}

/// Check if a URI matches a pattern with {param} placeholders
fn matches_uri_pattern(pattern: &str, uri: &str) -> bool {
    extract_uri_params(pattern, uri).is_some()
}

/// Match `uri` against `pattern` and collect the values bound to each `{param}`.
///
/// Placeholders must bind a non-empty segment.
pub fn extract_uri_params(pattern: &str, uri: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let uri_parts: Vec<&str> = uri.split('/').collect();

    if pattern_parts.len() != uri_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pattern_part, uri_part) in pattern_parts.iter().zip(uri_parts.iter()) {
        if pattern_part.starts_with('{') && pattern_part.ends_with('}') {
            if uri_part.is_empty() {
                return None;
            }
            let name = &pattern_part[1..pattern_part.len() - 1];
            params.insert(name.to_string(), uri_part.to_string());
            continue;
        }
        if pattern_part != uri_part {
            return None;
        }
    }

    Some(params)
}

// ============================================================================
// Builder helpers
// ============================================================================

/// Builder for a tool
pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
    annotations: ToolAnnotations,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            annotations: ToolAnnotations::default(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.annotations.title = Some(title.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.annotations.read_only_hint = read_only;
        self
    }

    pub fn destructive(mut self, destructive: bool) -> Self {
        self.annotations.destructive_hint = Some(destructive);
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            annotations: self.annotations,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }
}

/// Builder for a resource template
pub struct ResourceTemplateBuilder {
    uri_template: String,
    name: String,
    description: Option<String>,
    mime_type: Option<String>,
}

impl ResourceTemplateBuilder {
    pub fn new(uri_template: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: None,
            mime_type: None,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredResourceTemplate
    where
        F: Fn(ToolContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult> + Send + 'static,
    {
        RegisteredResourceTemplate {
            uri_template: self.uri_template,
            name: self.name,
            description: self.description,
            mime_type: self.mime_type,
            handler: Arc::new(move |ctx, uri| Box::pin(handler(ctx, uri))),
        }
    }
}

/// Builder for a prompt
pub struct PromptBuilder {
    name: String,
    description: Option<String>,
    arguments: Vec<PromptArgument>,
}

impl PromptBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn argument(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.arguments.push(PromptArgument {
            name: name.into(),
            description: Some(description.into()),
            required,
        });
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredPrompt
    where
        F: Fn(ToolContext, HashMap<String, String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PromptResult> + Send + 'static,
    {
        RegisteredPrompt {
            name: self.name,
            description: self.description,
            arguments: self.arguments,
            handler: Arc::new(move |ctx, args| Box::pin(handler(ctx, args))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::scope_filter::ScopeRule;

    fn noop_tool(name: &str, read_only: bool) -> RegisteredTool {
        ToolBuilder::new(name)
            .read_only(read_only)
            .build(|_ctx, _params| async { Ok(ToolsCallResult::text("ok")) })
    }

    #[test]
    fn test_uri_pattern_matching_exact() {
        assert!(matches_uri_pattern("toolsets://all", "toolsets://all"));
        assert!(!matches_uri_pattern("toolsets://all", "toolsets://none"));
    }

    #[test]
    fn test_uri_pattern_extracts_params() {
        let params = extract_uri_params("toolsets://{method}", "toolsets://server").unwrap();
        assert_eq!(params.get("method").map(String::as_str), Some("server"));
    }

    #[test]
    fn test_uri_pattern_rejects_empty_param_and_length_mismatch() {
        assert!(extract_uri_params("toolsets://{method}", "toolsets://").is_none());
        assert!(extract_uri_params("toolsets://{method}", "toolsets://a/b").is_none());
    }

    #[test]
    fn test_register_tool_replaces_same_name() {
        let mut registry = McpRegistry::new();
        registry.register_tool(noop_tool("a", false));
        registry.register_tool(noop_tool("a", true));
        assert_eq!(registry.tool_count(), 1);
        let tools = registry.list_tools(&[], &ScopeFilter::default());
        assert!(tools[0].annotations.read_only_hint);
    }

    #[test]
    fn test_list_tools_keeps_registration_order() {
        let mut registry = McpRegistry::new();
        registry.register_tool(noop_tool("b", true));
        registry.register_tool(noop_tool("a", true));
        let names: Vec<String> = registry
            .list_tools(&[], &ScopeFilter::default())
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_scope_filter_applies_to_list_and_lookup() {
        let mut registry = McpRegistry::new();
        registry.register_tool(noop_tool("desk_tickets", true));
        registry.register_tool(noop_tool("server_info", true));
        let filter = ScopeFilter::new(vec![ScopeRule {
            prefix: "desk_".to_string(),
            scope: "desk".to_string(),
        }]);
        let scopes = vec!["projects".to_string()];

        assert_eq!(registry.list_tools(&scopes, &filter).len(), 1);
        assert!(registry.get_tool("desk_tickets", &scopes, &filter).is_none());
        assert!(registry.get_tool("desk_tickets", &[], &filter).is_some());
    }

    #[test]
    fn test_prompt_required_arguments() {
        let prompt = PromptBuilder::new("p")
            .argument("method", "toolset", true)
            .build(|_ctx, _args| async {
                Ok(PromptsGetResult {
                    description: None,
                    messages: vec![],
                })
            });
        assert!(prompt.check_arguments(&HashMap::new()).is_err());

        let mut args = HashMap::new();
        args.insert("method".to_string(), "server".to_string());
        assert!(prompt.check_arguments(&args).is_ok());
    }
}
