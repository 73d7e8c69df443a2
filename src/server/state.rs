use axum::extract::FromRef;

use crate::auth::BearerAuthenticator;
use crate::mcp::McpState;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedAuthenticator = Arc<dyn BearerAuthenticator>;
pub type GuardedMcpState = Arc<McpState>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub authenticator: GuardedAuthenticator,
    pub mcp_state: GuardedMcpState,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        authenticator: GuardedAuthenticator,
        mcp_state: GuardedMcpState,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            authenticator,
            mcp_state,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedAuthenticator {
    fn from_ref(input: &ServerState) -> Self {
        input.authenticator.clone()
    }
}

impl FromRef<ServerState> for GuardedMcpState {
    fn from_ref(input: &ServerState) -> Self {
        input.mcp_state.clone()
    }
}
