pub mod config;
mod http_layers;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ServerConfig, DEFAULT_MAX_UNAUTHENTICATED_BODY_BYTES};
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use state::ServerState;
