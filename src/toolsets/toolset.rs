use crate::mcp::registry::{
    CapabilityHost, RegisteredPrompt, RegisteredResourceTemplate, RegisteredTool,
};

use super::Method;

/// A named bundle of tools, resource templates and prompts that can be
/// switched on as a unit.
///
/// Toolsets start disabled. Once read-only they never accept write tools again.
#[derive(Debug)]
pub struct Toolset {
    method: Method,
    description: String,
    enabled: bool,
    read_only: bool,
    write_tools: Vec<RegisteredTool>,
    read_tools: Vec<RegisteredTool>,
    resource_templates: Vec<RegisteredResourceTemplate>,
    prompts: Vec<RegisteredPrompt>,
}

impl Toolset {
    pub fn new(method: impl Into<Method>, description: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            description: description.into(),
            enabled: false,
            read_only: false,
            write_tools: Vec::new(),
            read_tools: Vec::new(),
            resource_templates: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    pub fn set_read_only(&mut self) -> &mut Self {
        self.read_only = true;
        self
    }

    /// Add tools that only read state.
    ///
    /// # Panics
    ///
    /// If any tool is not annotated read-only.
    pub fn add_read_tools(&mut self, tools: impl IntoIterator<Item = RegisteredTool>) -> &mut Self {
        for tool in tools {
            if !tool.is_read_only() {
                panic!(
                    "tool ({}) must be annotated as read-only to be added to toolset {}",
                    tool.name, self.method
                );
            }
            self.read_tools.push(tool);
        }
        self
    }

    /// Add tools that mutate state. Dropped without notice on a read-only toolset.
    ///
    /// # Panics
    ///
    /// If any tool is annotated read-only.
    pub fn add_write_tools(
        &mut self,
        tools: impl IntoIterator<Item = RegisteredTool>,
    ) -> &mut Self {
        for tool in tools {
            if tool.is_read_only() {
                panic!(
                    "tool ({}) is incorrectly annotated as read-only for the write tools of toolset {}",
                    tool.name, self.method
                );
            }
            if !self.read_only {
                self.write_tools.push(tool);
            }
        }
        self
    }

    pub fn add_resource_templates(
        &mut self,
        templates: impl IntoIterator<Item = RegisteredResourceTemplate>,
    ) -> &mut Self {
        self.resource_templates.extend(templates);
        self
    }

    pub fn add_prompts(&mut self, prompts: impl IntoIterator<Item = RegisteredPrompt>) -> &mut Self {
        self.prompts.extend(prompts);
        self
    }

    /// Tools to publish: nothing while disabled, reads only when read-only,
    /// otherwise reads followed by writes.
    pub fn active_tools(&self) -> Vec<&RegisteredTool> {
        if !self.enabled {
            return Vec::new();
        }
        self.available_tools()
    }

    /// Like [`Toolset::active_tools`] but ignoring the enabled flag.
    pub fn available_tools(&self) -> Vec<&RegisteredTool> {
        let writes: &[RegisteredTool] = if self.read_only {
            &[]
        } else {
            &self.write_tools
        };
        self.read_tools.iter().chain(writes.iter()).collect()
    }

    pub fn active_resource_templates(&self) -> Vec<&RegisteredResourceTemplate> {
        if !self.enabled {
            return Vec::new();
        }
        self.available_resource_templates()
    }

    pub fn available_resource_templates(&self) -> Vec<&RegisteredResourceTemplate> {
        self.resource_templates.iter().collect()
    }

    pub fn active_prompts(&self) -> Vec<&RegisteredPrompt> {
        if !self.enabled {
            return Vec::new();
        }
        self.available_prompts()
    }

    pub fn available_prompts(&self) -> Vec<&RegisteredPrompt> {
        self.prompts.iter().collect()
    }

    pub fn register_tools<H: CapabilityHost + ?Sized>(&self, host: &mut H) {
        for tool in self.active_tools() {
            host.register_tool(tool.clone());
        }
    }

    pub fn register_resource_templates<H: CapabilityHost + ?Sized>(&self, host: &mut H) {
        for template in self.active_resource_templates() {
            host.register_resource_template(template.clone());
        }
    }

    pub fn register_prompts<H: CapabilityHost + ?Sized>(&self, host: &mut H) {
        for prompt in self.active_prompts() {
            host.register_prompt(prompt.clone());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mcp::protocol::{PromptsGetResult, ResourceContent, ToolsCallResult};
    use crate::mcp::registry::{McpRegistry, PromptBuilder, ResourceTemplateBuilder, ToolBuilder};
    use crate::mcp::ScopeFilter;

    pub(crate) fn tool(name: &str, read_only: bool) -> RegisteredTool {
        ToolBuilder::new(name)
            .read_only(read_only)
            .build(|_ctx, _params| async { Ok(ToolsCallResult::text("ok")) })
    }

    fn template(pattern: &str) -> RegisteredResourceTemplate {
        ResourceTemplateBuilder::new(pattern, pattern).build(|_ctx, uri| async move {
            Ok(vec![ResourceContent {
                uri,
                mime_type: None,
                text: String::new(),
            }])
        })
    }

    fn prompt(name: &str) -> RegisteredPrompt {
        PromptBuilder::new(name).build(|_ctx, _args| async {
            Ok(PromptsGetResult {
                description: None,
                messages: vec![],
            })
        })
    }

    fn names(tools: Vec<&RegisteredTool>) -> Vec<String> {
        tools.into_iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_new_toolset_is_disabled_and_writable() {
        let toolset = Toolset::new("projects", "Projects");
        assert!(!toolset.is_enabled());
        assert!(!toolset.is_read_only());
        assert_eq!(toolset.description(), "Projects");
    }

    #[test]
    fn test_available_tools_lists_reads_then_writes() {
        let mut toolset = Toolset::new("projects", "");
        toolset
            .add_write_tools([tool("create", false), tool("delete", false)])
            .add_read_tools([tool("list", true), tool("get", true)]);

        assert_eq!(
            names(toolset.available_tools()),
            vec!["list", "get", "create", "delete"]
        );
        assert!(toolset.active_tools().is_empty());

        toolset.set_enabled(true);
        assert_eq!(toolset.active_tools().len(), 4);
    }

    #[test]
    fn test_write_tools_dropped_after_set_read_only() {
        let mut toolset = Toolset::new("projects", "");
        toolset.add_read_tools([tool("list", true)]).set_read_only();
        let before = names(toolset.available_tools());

        toolset.add_write_tools([tool("create", false)]);

        assert_eq!(names(toolset.available_tools()), before);
    }

    #[test]
    fn test_read_only_hides_previously_added_writes() {
        let mut toolset = Toolset::new("projects", "");
        toolset
            .add_write_tools([tool("create", false)])
            .add_read_tools([tool("list", true)])
            .set_enabled(true)
            .set_read_only();
        assert_eq!(names(toolset.active_tools()), vec!["list"]);
    }

    #[test]
    #[should_panic(expected = "must be annotated as read-only")]
    fn test_read_tool_without_annotation_panics() {
        Toolset::new("projects", "").add_read_tools([tool("create", false)]);
    }

    #[test]
    #[should_panic(expected = "incorrectly annotated as read-only")]
    fn test_write_tool_with_read_only_annotation_panics() {
        Toolset::new("projects", "").add_write_tools([tool("list", true)]);
    }

    #[test]
    #[should_panic(expected = "incorrectly annotated as read-only")]
    fn test_annotation_checked_even_when_read_only() {
        let mut toolset = Toolset::new("projects", "");
        toolset.set_read_only();
        toolset.add_write_tools([tool("list", true)]);
    }

    #[test]
    fn test_register_is_noop_when_disabled() {
        let mut toolset = Toolset::new("projects", "");
        toolset
            .add_read_tools([tool("list", true)])
            .add_resource_templates([template("projects://{id}")])
            .add_prompts([prompt("summary")]);

        let mut host = McpRegistry::new();
        toolset.register_tools(&mut host);
        toolset.register_resource_templates(&mut host);
        toolset.register_prompts(&mut host);
        assert_eq!(host.tool_count(), 0);
        assert_eq!(host.resource_template_count(), 0);
        assert_eq!(host.prompt_count(), 0);

        toolset.set_enabled(true);
        toolset.register_tools(&mut host);
        toolset.register_resource_templates(&mut host);
        toolset.register_prompts(&mut host);
        assert_eq!(host.tool_count(), 1);
        assert_eq!(host.resource_template_count(), 1);
        assert_eq!(host.prompt_count(), 1);
        assert_eq!(host.list_tools(&[], &ScopeFilter::default())[0].name, "list");
    }

    #[test]
    fn test_active_templates_and_prompts_gate_on_enabled() {
        let mut toolset = Toolset::new("projects", "");
        toolset
            .add_resource_templates([template("projects://{id}")])
            .add_prompts([prompt("summary")]);
        assert!(toolset.active_resource_templates().is_empty());
        assert!(toolset.active_prompts().is_empty());
        assert_eq!(toolset.available_resource_templates().len(), 1);
        assert_eq!(toolset.available_prompts().len(), 1);
    }
}
