//! Routes served outside the JSON-RPC endpoint.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::state::ServerState;
use super::ServerConfig;

pub const HEALTH_PATH: &str = "/api/health";
pub const PROTECTED_RESOURCE_PATH: &str = "/.well-known/oauth-protected-resource";

/// OAuth 2.0 protected resource metadata (RFC 9728).
#[derive(Debug, Serialize)]
pub struct ProtectedResourceMetadata {
    pub resource: String,
    pub authorization_servers: Vec<String>,
    pub bearer_methods_supported: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_documentation: Option<String>,
}

impl ProtectedResourceMetadata {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            resource: config.mcp_url.clone(),
            authorization_servers: vec![config.api_url.clone()],
            bearer_methods_supported: vec!["header".to_string()],
            resource_documentation: config.resource_documentation.clone(),
        }
    }
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn protected_resource(method: Method, State(config): State<ServerConfig>) -> Response {
    let mut response = if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        Json(ProtectedResourceMetadata::from_config(&config)).into_response()
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

pub fn make_public_routes() -> Router<ServerState> {
    Router::new()
        .route(HEALTH_PATH, get(health).options(health))
        .route(
            PROTECTED_RESOURCE_PATH,
            get(protected_resource).options(protected_resource),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_config() {
        let config = ServerConfig {
            mcp_url: "https://mcp.example.com".to_string(),
            api_url: "https://api.example.com".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(ProtectedResourceMetadata::from_config(&config)).unwrap();
        assert_eq!(value["resource"], "https://mcp.example.com");
        assert_eq!(value["authorization_servers"][0], "https://api.example.com");
        assert_eq!(value["bearer_methods_supported"][0], "header");
        assert!(value.get("resource_documentation").is_none());
    }
}
