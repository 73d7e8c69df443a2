//! MCP HTTP Handler
//!
//! One JSON-RPC message per POST, answered in the response body. No sessions.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::context::{ServerMetadata, ToolContext};
use super::protocol::{
    methods, InitializeParams, InitializeResult, ListCapability, McpError, McpRequest,
    McpResponse, PromptsGetParams, PromptsListResult, ResourceTemplatesListResult,
    ResourcesCapability, ResourcesListResult, ResourcesReadParams, ResourcesReadResult,
    ServerCapabilities, ServerInfo, SetLevelParams, ToolsCallParams, ToolsListResult,
    MCP_PROTOCOL_VERSION,
};
use super::registry::McpRegistry;
use super::scope_filter::ScopeFilter;
use crate::auth::{bypass_method, SecurityContext};
use crate::server::state::GuardedMcpState;
use crate::toolsets::ToolsetGroup;

const LOG_LEVELS: &[&str] = &[
    "debug",
    "info",
    "notice",
    "warning",
    "error",
    "critical",
    "alert",
    "emergency",
];

/// State shared by every MCP request. Frozen after startup.
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub scope_filter: ScopeFilter,
    pub server: Arc<ServerMetadata>,
    pub has_tools: bool,
}

/// POST handler for the JSON-RPC endpoint
pub async fn mcp_handler(
    State(mcp_state): State<GuardedMcpState>,
    security: Option<SecurityContext>,
    body: Bytes,
) -> Response {
    match handle_message(&body, security, &mcp_state).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle a single MCP message. Notifications produce no response.
pub async fn handle_message(
    body: &[u8],
    security: Option<SecurityContext>,
    mcp_state: &McpState,
) -> Option<McpResponse> {
    let request: McpRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) => {
            return Some(McpResponse::error(
                None,
                McpError::ParseError(e.to_string()),
            ));
        }
    };

    let request_id = request.id.clone();

    let result = if security.is_none() && !bypass_method(&request.method) {
        Err(McpError::Unauthorized)
    } else {
        let ctx = ToolContext {
            security,
            server: mcp_state.server.clone(),
        };
        dispatch(&request, ctx, mcp_state).await
    };

    if request.is_notification() {
        if let Err(error) = result {
            debug!("Notification {} failed: {}", request.method, error.message());
        }
        return None;
    }

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(request_id, error),
    })
}

async fn dispatch(
    request: &McpRequest,
    ctx: ToolContext,
    mcp_state: &McpState,
) -> Result<Value, McpError> {
    match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(request, mcp_state),
        methods::INITIALIZED => Ok(Value::Null),
        methods::PING => Ok(serde_json::json!({})),
        methods::LOGGING_SET_LEVEL => handle_set_level(request),
        methods::TOOLS_LIST => handle_tools_list(&ctx, mcp_state),
        methods::TOOLS_CALL => handle_tools_call(request, ctx, mcp_state).await,
        methods::RESOURCES_LIST => to_value(ResourcesListResult {
            resources: Vec::new(),
        }),
        methods::RESOURCES_TEMPLATES_LIST => to_value(ResourceTemplatesListResult {
            resource_templates: mcp_state.registry.list_resource_templates(),
        }),
        methods::RESOURCES_READ => handle_resources_read(request, ctx, mcp_state).await,
        methods::PROMPTS_LIST => to_value(PromptsListResult {
            prompts: mcp_state.registry.list_prompts(),
        }),
        methods::PROMPTS_GET => handle_prompts_get(request, ctx, mcp_state).await,
        other => Err(McpError::MethodNotFound(other.to_string())),
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_initialize(request: &McpRequest, mcp_state: &McpState) -> Result<Value, McpError> {
    let params: Option<InitializeParams> = request.optional_params()?;
    if let Some(client) = params.as_ref().and_then(|p| p.client_info.as_ref()) {
        debug!("MCP initialize from {} {}", client.name, client.version);
    }

    to_value(InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: mcp_state
                .has_tools
                .then_some(ListCapability { list_changed: None }),
            resources: Some(ResourcesCapability {
                subscribe: Some(false),
                list_changed: None,
            }),
            prompts: Some(ListCapability { list_changed: None }),
            logging: serde_json::json!({}),
        },
        server_info: ServerInfo {
            name: mcp_state.server.name.clone(),
            version: mcp_state.server.version.clone(),
        },
    })
}

fn handle_set_level(request: &McpRequest) -> Result<Value, McpError> {
    let params: SetLevelParams = request.params()?;
    if !LOG_LEVELS.contains(&params.level.as_str()) {
        return Err(McpError::InvalidParams(format!(
            "unknown log level: {}",
            params.level
        )));
    }
    debug!("Client requested log level {}", params.level);
    Ok(serde_json::json!({}))
}

fn caller_scopes(ctx: &ToolContext) -> &[String] {
    ctx.security
        .as_ref()
        .map(|security| security.scopes.as_slice())
        .unwrap_or(&[])
}

fn handle_tools_list(ctx: &ToolContext, mcp_state: &McpState) -> Result<Value, McpError> {
    let tools = mcp_state
        .registry
        .list_tools(caller_scopes(ctx), &mcp_state.scope_filter);
    to_value(ToolsListResult { tools })
}

async fn handle_tools_call(
    request: &McpRequest,
    ctx: ToolContext,
    mcp_state: &McpState,
) -> Result<Value, McpError> {
    let params: ToolsCallParams = request.params()?;

    let tool = mcp_state
        .registry
        .get_tool(&params.name, caller_scopes(&ctx), &mcp_state.scope_filter)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    debug!("Calling tool {} for user {:?}", tool.name, ctx.user_id());
    let arguments = params.arguments.unwrap_or(serde_json::json!({}));
    let result = (tool.handler)(ctx, arguments).await?;

    to_value(result)
}

async fn handle_resources_read(
    request: &McpRequest,
    ctx: ToolContext,
    mcp_state: &McpState,
) -> Result<Value, McpError> {
    let params: ResourcesReadParams = request.params()?;

    let template = mcp_state
        .registry
        .find_resource_template(&params.uri)
        .ok_or_else(|| McpError::ResourceNotFound(params.uri.clone()))?;

    let contents = (template.handler)(ctx, params.uri).await?;

    to_value(ResourcesReadResult { contents })
}

async fn handle_prompts_get(
    request: &McpRequest,
    ctx: ToolContext,
    mcp_state: &McpState,
) -> Result<Value, McpError> {
    let params: PromptsGetParams = request.params()?;

    let prompt = mcp_state
        .registry
        .get_prompt(&params.name)
        .ok_or_else(|| McpError::InvalidParams(format!("Unknown prompt: {}", params.name)))?;
    prompt.check_arguments(&params.arguments)?;

    let result = (prompt.handler)(ctx, params.arguments).await?;

    to_value(result)
}

/// Publish the enabled capabilities of `group` and freeze them into the MCP state
pub fn create_mcp_state(
    group: &ToolsetGroup,
    scope_filter: ScopeFilter,
    deployment_region: &str,
) -> McpState {
    let mut registry = McpRegistry::new();
    group.register_all(&mut registry);

    let has_tools = group.has_tools();
    if !has_tools {
        warn!("No tools enabled; only resources and prompts will be served");
    }

    info!(
        "MCP registry initialized with {} tools, {} resource templates and {} prompts",
        registry.tool_count(),
        registry.resource_template_count(),
        registry.prompt_count()
    );

    let server = ServerMetadata::new(group.is_read_only(), deployment_region)
        .with_toolsets(group.summaries());

    McpState {
        registry: Arc::new(registry),
        scope_filter,
        server: Arc::new(server),
        has_tools,
    }
}
