//! Request authentication: the unauthenticated bypass policy, bearer token
//! validation and the per-request security context.

mod bearer_info;
mod bypass;
mod security_context;

pub use bearer_info::{
    BearerAuthenticator, BearerInfo, BearerInfoError, BearerInfoMeta, IdentityClient,
};
pub use bypass::{bypass, bypass_method, BypassError, BYPASS_METHODS};
pub use security_context::{is_cross_region, BearerToken, SecurityContext};
