//! Toolsets
//!
//! Capabilities are grouped into named toolsets that are enabled at startup and
//! then published to the capability host.
//!
//! ## Lifecycle
//!
//! 1. Every toolset method is registered in a [`MethodRegistry`].
//! 2. Toolsets are built with their read and write tools and added to a
//!    [`ToolsetGroup`], which forces read-only mode when configured.
//! 3. The group enables the methods selected by configuration (or `all`).
//! 4. [`ToolsetGroup::register_all`] publishes the enabled capabilities.

mod group;
mod method;
mod toolset;

use thiserror::Error;

pub use group::{ToolsetGroup, ToolsetSummary};
pub use method::{Method, MethodRegistry, METHOD_ALL};
pub use toolset::Toolset;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolsetError {
    #[error("toolset {0} does not exist")]
    DoesNotExist(Method),

    #[error("invalid toolsets: {}", .0.join(", "))]
    InvalidMethods(Vec<String>),
}
