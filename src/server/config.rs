use super::RequestsLoggingLevel;

pub const DEFAULT_MAX_UNAUTHENTICATED_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    /// Region this deployment serves; tokens from other regions are flagged cross-region.
    pub deployment_region: String,
    /// Public URL of this server, advertised as the protected resource.
    pub mcp_url: String,
    /// Product API base URL, advertised as the authorization server.
    pub api_url: String,
    pub resource_documentation: Option<String>,
    /// Largest body buffered to evaluate the bypass policy.
    pub max_unauthenticated_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            deployment_region: "us-east-1".to_string(),
            mcp_url: "http://localhost:8080".to_string(),
            api_url: "http://localhost:9000".to_string(),
            resource_documentation: None,
            max_unauthenticated_body_bytes: DEFAULT_MAX_UNAUTHENTICATED_BODY_BYTES,
        }
    }
}
