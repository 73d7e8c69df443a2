mod authentication;
mod requests_logging;

pub use authentication::{authenticate, AuthRejection};
pub use requests_logging::{log_requests, RequestsLoggingLevel};
