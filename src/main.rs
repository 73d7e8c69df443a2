use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toolset_server::config::{AppConfig, CliConfig, FileConfig};
use toolset_server::mcp::{create_mcp_state, tools};
use toolset_server::server::{run_server, ServerState, DEFAULT_MAX_UNAUTHENTICATED_BODY_BYTES};
use toolset_server::{IdentityClient, MethodRegistry, RequestsLoggingLevel, ToolsetGroup};

#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, env = "TOOLSET_SERVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on, `host:port` or `:port`.
    #[clap(long, env = "TOOLSET_SERVER_ADDRESS", default_value = ":8080")]
    pub bind_address: String,

    /// Region of this deployment.
    #[clap(long, env = "TOOLSET_SERVER_REGION", default_value = "us-east-1")]
    pub deployment_region: String,

    /// Public URL of this server.
    #[clap(long, env = "TOOLSET_SERVER_URL", default_value = "http://localhost:8080")]
    pub mcp_url: String,

    /// Base URL of the product API that validates bearer tokens.
    #[clap(long, env = "TOOLSET_SERVER_API_URL")]
    pub api_url: Option<String>,

    /// Documentation URL advertised in the protected resource metadata.
    #[clap(long, env = "TOOLSET_SERVER_RESOURCE_DOCUMENTATION")]
    pub resource_documentation: Option<String>,

    /// Comma separated toolsets to enable, or `all`.
    #[clap(long, env = "TOOLSET_SERVER_TOOLSETS", default_value = "all")]
    pub toolsets: String,

    /// Only expose read-only tools.
    #[clap(long, env = "TOOLSET_SERVER_READ_ONLY")]
    pub read_only: bool,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Timeout in seconds for identity service requests.
    #[clap(long, default_value_t = 10)]
    pub identity_timeout_sec: u64,

    /// Largest request body accepted without credentials.
    #[clap(long, default_value_t = DEFAULT_MAX_UNAUTHENTICATED_BODY_BYTES)]
    pub max_unauthenticated_body_bytes: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            bind_address: self.bind_address.clone(),
            deployment_region: self.deployment_region.clone(),
            mcp_url: self.mcp_url.clone(),
            api_url: self.api_url.clone(),
            resource_documentation: self.resource_documentation.clone(),
            toolsets: self.toolsets.clone(),
            read_only: self.read_only,
            logging_level: self.logging_level.clone(),
            identity_timeout_sec: self.identity_timeout_sec,
            max_unauthenticated_body_bytes: self.max_unauthenticated_body_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let method_registry = Arc::new(MethodRegistry::new());
    tools::register_methods(&method_registry);

    let methods = method_registry
        .parse_methods(&config.toolsets)
        .with_context(|| {
            let valid: Vec<String> = method_registry
                .registered_methods()
                .iter()
                .map(ToString::to_string)
                .collect();
            format!("Valid toolsets are: all, {}", valid.join(", "))
        })?;

    let mut group = ToolsetGroup::new(config.read_only);
    for toolset in tools::all_toolsets() {
        group.add_toolset(toolset);
    }
    group.enable_toolsets(&methods)?;

    let mcp_state = create_mcp_state(&group, config.scope_filter(), &config.deployment_region);

    info!(
        "Validating bearer tokens against {} (region {}, read-only: {})",
        config.api_url, config.deployment_region, config.read_only
    );
    let authenticator = IdentityClient::new(&config.api_url, config.identity_timeout())?;

    let state = ServerState::new(
        config.server_config(),
        Arc::new(authenticator),
        Arc::new(mcp_state),
    );

    run_server(config.bind_address, state).await
}
