use serde::Deserialize;
use thiserror::Error;

/// Protocol methods that may run without a bearer token.
pub const BYPASS_METHODS: &[&str] = &[
    "initialize",
    "notifications/initialized",
    "logging/setLevel",
    "tools/list",
    "resources/list",
    "resources/templates/list",
    "prompts/list",
];

#[derive(Debug, Error)]
pub enum BypassError {
    #[error("failed to parse request body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("method {0:?} requires authentication")]
    NotAuthenticated(String),
}

#[derive(Debug, Deserialize)]
struct BaseMessage {
    #[serde(default)]
    method: String,
}

pub fn bypass_method(method: &str) -> bool {
    BYPASS_METHODS.contains(&method)
}

/// Decide whether an unauthenticated request body may proceed.
pub fn bypass(raw: &[u8]) -> Result<(), BypassError> {
    let message: BaseMessage = serde_json::from_slice(raw)?;
    if bypass_method(&message.method) {
        Ok(())
    } else {
        Err(BypassError::NotAuthenticated(message.method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_method_membership() {
        assert!(bypass_method("tools/list"));
        assert!(bypass_method("initialize"));
        assert!(!bypass_method("tools/call"));
        assert!(!bypass_method("Tools/List"));
        assert!(!bypass_method(""));
    }

    #[test]
    fn test_bypass_allows_whitelisted_method() {
        assert!(bypass(br#"{"method":"initialize"}"#).is_ok());
        assert!(bypass(br#"{"jsonrpc":"2.0","id":1,"method":"prompts/list","params":{}}"#).is_ok());
    }

    #[test]
    fn test_bypass_rejects_other_methods() {
        let err = bypass(br#"{"method":"tools/call"}"#).unwrap_err();
        assert!(matches!(err, BypassError::NotAuthenticated(ref m) if m == "tools/call"));
    }

    #[test]
    fn test_bypass_invalid_json_is_parse_error() {
        let err = bypass(b"{").unwrap_err();
        assert!(matches!(err, BypassError::Parse(_)));
    }

    #[test]
    fn test_bypass_without_method_is_not_authenticated() {
        assert!(matches!(
            bypass(b"{}").unwrap_err(),
            BypassError::NotAuthenticated(_)
        ));
    }

    #[test]
    fn test_bypass_batch_is_parse_error() {
        assert!(matches!(
            bypass(br#"[{"method":"initialize"}]"#).unwrap_err(),
            BypassError::Parse(_)
        ));
    }
}
