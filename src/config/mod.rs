mod file_config;

pub use file_config::{FileConfig, ScopeFilterConfig};

use crate::mcp::ScopeFilter;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub bind_address: String,
    pub deployment_region: String,
    pub mcp_url: String,
    pub api_url: Option<String>,
    pub resource_documentation: Option<String>,
    pub toolsets: String,
    pub read_only: bool,
    pub logging_level: RequestsLoggingLevel,
    pub identity_timeout_sec: u64,
    pub max_unauthenticated_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub deployment_region: String,
    pub mcp_url: String,
    pub api_url: String,
    pub resource_documentation: Option<String>,
    /// Comma separated toolset methods, `all` when empty.
    pub toolsets: String,
    pub read_only: bool,
    pub logging_level: RequestsLoggingLevel,
    pub identity_timeout_sec: u64,
    pub max_unauthenticated_body_bytes: usize,
    pub scope_prefixes: BTreeMap<String, String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());
        let bind_address = parse_bind_address(&bind_address)?;

        let deployment_region = file
            .deployment_region
            .unwrap_or_else(|| cli.deployment_region.clone());
        if deployment_region.trim().is_empty() {
            bail!("deployment_region must not be empty");
        }

        let api_url = file
            .api_url
            .or_else(|| cli.api_url.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("api_url must be specified via --api-url or in config file")
            })?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            bail!("api_url must be an http(s) URL: {}", api_url);
        }

        let mcp_url = file.mcp_url.unwrap_or_else(|| cli.mcp_url.clone());
        let resource_documentation = file
            .resource_documentation
            .or_else(|| cli.resource_documentation.clone());
        let toolsets = file.toolsets.unwrap_or_else(|| cli.toolsets.clone());
        let read_only = file.read_only.unwrap_or(cli.read_only);

        let logging_level = match file.logging_level {
            Some(level) => parse_logging_level(&level)
                .with_context(|| format!("Invalid logging_level: {}", level))?,
            None => cli.logging_level.clone(),
        };

        let identity_timeout_sec = file
            .identity_timeout_sec
            .unwrap_or(cli.identity_timeout_sec);
        if identity_timeout_sec == 0 {
            bail!("identity_timeout_sec must be greater than zero");
        }

        let max_unauthenticated_body_bytes = file
            .max_unauthenticated_body_bytes
            .unwrap_or(cli.max_unauthenticated_body_bytes);

        let scope_prefixes = file.scope_filter.unwrap_or_default().prefixes;

        Ok(Self {
            bind_address,
            deployment_region,
            mcp_url,
            api_url,
            resource_documentation,
            toolsets,
            read_only,
            logging_level,
            identity_timeout_sec,
            max_unauthenticated_body_bytes,
            scope_prefixes,
        })
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(self.identity_timeout_sec)
    }

    pub fn scope_filter(&self) -> ScopeFilter {
        ScopeFilter::from_prefixes(&self.scope_prefixes)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            deployment_region: self.deployment_region.clone(),
            mcp_url: self.mcp_url.clone(),
            api_url: self.api_url.clone(),
            resource_documentation: self.resource_documentation.clone(),
            max_unauthenticated_body_bytes: self.max_unauthenticated_body_bytes,
        }
    }
}

/// Accepts `host:port` or the `:port` shorthand for all interfaces.
fn parse_bind_address(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    let full = match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => value.to_string(),
    };
    full.parse()
        .with_context(|| format!("Invalid bind address: {:?}", value))
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
