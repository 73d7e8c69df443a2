//! Server Toolset
//!
//! Introspection of the running server and of the caller's identity.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, PromptMessage, PromptsGetResult, ResourceContent, ToolsCallResult};
use crate::mcp::registry::{
    extract_uri_params, PromptBuilder, PromptResult, RegisteredPrompt, RegisteredResourceTemplate,
    RegisteredTool, ResourceResult, ResourceTemplateBuilder, ToolBuilder, ToolResult,
};
use crate::toolsets::{Method, Toolset};

pub const METHOD: &str = "server";

const TOOLSET_URI_TEMPLATE: &str = "toolsets://{method}";

pub fn toolset() -> Toolset {
    let mut toolset = Toolset::new(METHOD, "Information about this server and the current caller");
    toolset
        .add_read_tools([server_info_tool(), server_whoami_tool()])
        .add_resource_templates([toolset_resource_template()])
        .add_prompts([toolset_overview_prompt()]);
    toolset
}

// ============================================================================
// server_info
// ============================================================================

#[derive(Debug, Serialize)]
struct ServerInfoResult {
    name: String,
    version: String,
    read_only: bool,
    deployment_region: String,
    uptime_secs: u64,
    toolsets: Vec<ToolsetState>,
}

#[derive(Debug, Serialize)]
struct ToolsetState {
    method: Method,
    enabled: bool,
}

fn server_info_tool() -> RegisteredTool {
    ToolBuilder::new("server_info")
        .title("Server info")
        .description("Get the server version, deployment region, read-only mode and toolsets")
        .read_only(true)
        .build(server_info_handler)
}

async fn server_info_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let server = &ctx.server;
    let result = ServerInfoResult {
        name: server.name.clone(),
        version: server.version.clone(),
        read_only: server.read_only,
        deployment_region: server.deployment_region.clone(),
        uptime_secs: server.start_time.elapsed().as_secs(),
        toolsets: server
            .toolsets
            .iter()
            .map(|summary| ToolsetState {
                method: summary.method.clone(),
                enabled: summary.enabled,
            })
            .collect(),
    };

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// server_whoami
// ============================================================================

fn server_whoami_tool() -> RegisteredTool {
    ToolBuilder::new("server_whoami")
        .title("Who am I")
        .description(
            "Get the identity behind the current token: user, installation, tenant URL, scopes and whether the request crossed regions",
        )
        .read_only(true)
        .build(server_whoami_handler)
}

async fn server_whoami_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    match &ctx.security {
        Some(security) => {
            ToolsCallResult::json(security).map_err(|e| McpError::InternalError(e.to_string()))
        }
        None => Ok(ToolsCallResult::error("request is not authenticated")),
    }
}

// ============================================================================
// toolsets://{method}
// ============================================================================

fn toolset_resource_template() -> RegisteredResourceTemplate {
    ResourceTemplateBuilder::new(TOOLSET_URI_TEMPLATE, "Toolset")
        .description("Description, state and tools of one toolset")
        .mime_type("application/json")
        .build(toolset_resource_handler)
}

async fn toolset_resource_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let method = extract_uri_params(TOOLSET_URI_TEMPLATE, &uri)
        .and_then(|mut params| params.remove("method"))
        .ok_or_else(|| McpError::ResourceNotFound(uri.clone()))?;

    let summary = ctx
        .server
        .toolsets
        .iter()
        .find(|summary| summary.method.as_str() == method.as_str())
        .ok_or_else(|| McpError::ResourceNotFound(uri.clone()))?;

    let text =
        serde_json::to_string_pretty(summary).map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(vec![ResourceContent {
        uri,
        mime_type: Some("application/json".to_string()),
        text,
    }])
}

// ============================================================================
// toolset_overview
// ============================================================================

fn toolset_overview_prompt() -> RegisteredPrompt {
    PromptBuilder::new("toolset_overview")
        .description("Summarize the toolsets enabled on this server")
        .argument("method", "Only describe this toolset", false)
        .build(toolset_overview_handler)
}

async fn toolset_overview_handler(ctx: ToolContext, args: HashMap<String, String>) -> PromptResult {
    let focus = args.get("method");
    if let Some(method) = focus {
        if !ctx.server.toolsets.iter().any(|s| s.method.as_str() == method.as_str()) {
            return Err(McpError::InvalidParams(format!("unknown toolset: {}", method)));
        }
    }

    let mut text = String::from("The following toolsets are enabled on this server:\n");
    for summary in ctx
        .server
        .toolsets
        .iter()
        .filter(|s| s.enabled)
        .filter(|s| focus.map_or(true, |m| s.method.as_str() == m.as_str()))
    {
        text.push_str(&format!(
            "- {}: {} ({})\n",
            summary.method,
            summary.description,
            summary.tools.join(", ")
        ));
    }
    if ctx.server.read_only {
        text.push_str("The server is read-only; write tools are unavailable.\n");
    }

    Ok(PromptsGetResult {
        description: Some("Enabled toolsets".to_string()),
        messages: vec![PromptMessage::user(text)],
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{BearerInfo, BearerInfoMeta, BearerToken, SecurityContext};
    use crate::mcp::context::ServerMetadata;
    use crate::toolsets::ToolsetGroup;

    fn context(security: Option<SecurityContext>) -> ToolContext {
        let mut group = ToolsetGroup::new(true);
        group.add_toolset(toolset());
        group.enable_toolsets(&[Method::all()]).unwrap();
        ToolContext {
            security,
            server: Arc::new(
                ServerMetadata::new(true, "eu-west-1").with_toolsets(group.summaries()),
            ),
        }
    }

    fn text_of(result: &ToolsCallResult) -> String {
        match &result.content[0] {
            crate::mcp::protocol::ToolResultContent::Text { text } => text.clone(),
        }
    }

    #[test]
    fn test_toolset_shape() {
        let toolset = toolset();
        assert_eq!(toolset.method().as_str(), METHOD);
        assert_eq!(toolset.available_tools().len(), 2);
        assert!(toolset.available_tools().iter().all(|t| t.is_read_only()));
        assert_eq!(toolset.available_resource_templates().len(), 1);
        assert_eq!(toolset.available_prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_server_info() {
        let result = server_info_handler(context(None), Value::Null).await.unwrap();
        let value: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(value["read_only"], true);
        assert_eq!(value["deployment_region"], "eu-west-1");
        assert_eq!(value["toolsets"][0]["method"], "server");
    }

    #[tokio::test]
    async fn test_whoami_without_identity_is_error_result() {
        let result = server_whoami_handler(context(None), Value::Null).await.unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_whoami_reports_identity_without_token() {
        let security = SecurityContext::from_bearer_info(
            BearerInfo {
                user_id: 42,
                installation_id: 7,
                region: "us-east-1".to_string(),
                url: "https://tenant.example.com".to_string(),
                meta: BearerInfoMeta::default(),
            },
            BearerToken::new("secret"),
            "eu-west-1",
        );
        let result = server_whoami_handler(context(Some(security)), Value::Null)
            .await
            .unwrap();
        let text = text_of(&result);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["user_id"], 42);
        assert_eq!(value["cross_region"], true);
        assert!(!text.contains("secret"));
    }

    #[tokio::test]
    async fn test_toolset_resource() {
        let contents = toolset_resource_handler(context(None), "toolsets://server".to_string())
            .await
            .unwrap();
        assert!(contents[0].text.contains("server_info"));

        let err = toolset_resource_handler(context(None), "toolsets://nope".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_overview_prompt() {
        let result = toolset_overview_handler(context(None), HashMap::new())
            .await
            .unwrap();
        assert_eq!(result.messages.len(), 1);

        let mut args = HashMap::new();
        args.insert("method".to_string(), "nope".to_string());
        assert!(toolset_overview_handler(context(None), args).await.is_err());
    }
}
