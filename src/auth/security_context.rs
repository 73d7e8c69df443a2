use std::fmt;

use serde::Serialize;

use super::BearerInfo;

/// A validated bearer token. Never rendered by `Debug` or serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Identity of an authenticated caller, attached to the request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityContext {
    pub customer_url: String,
    pub scopes: Vec<String>,
    pub cross_region: bool,
    pub user_id: i64,
    pub installation_id: i64,
    #[serde(skip)]
    pub bearer_token: BearerToken,
}

impl SecurityContext {
    pub fn from_bearer_info(info: BearerInfo, token: BearerToken, deployment_region: &str) -> Self {
        Self {
            cross_region: is_cross_region(deployment_region, &info.region),
            customer_url: info.url,
            scopes: info.meta.scopes,
            user_id: info.user_id,
            installation_id: info.installation_id,
            bearer_token: token,
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Regions are compared ignoring ASCII case.
pub fn is_cross_region(deployment_region: &str, identity_region: &str) -> bool {
    !deployment_region.eq_ignore_ascii_case(identity_region)
}
