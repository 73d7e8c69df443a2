//! Built-in toolsets

pub mod server;

use crate::toolsets::{MethodRegistry, Toolset};

/// Register the method of every built-in toolset
pub fn register_methods(registry: &MethodRegistry) {
    registry.register_method(server::METHOD);
}

/// Build every built-in toolset, disabled
pub fn all_toolsets() -> Vec<Toolset> {
    vec![server::toolset()]
}
