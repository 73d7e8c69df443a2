//! Bearer token validation against the identity service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const USERINFO_PATH: &str = "/launchpad/v1/userinfo.json";

/// What the identity service knows about a token holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BearerInfo {
    pub user_id: i64,
    pub installation_id: i64,
    #[serde(rename = "awsRegion")]
    pub region: String,
    pub url: String,
    pub meta: BearerInfoMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BearerInfoMeta {
    pub scopes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BearerInfoError {
    #[error("unauthorized: failed to get bearer info")]
    Unauthorized,

    #[error("failed to perform bearer info request: {0}")]
    Request(String),

    #[error("failed to decode bearer info response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait BearerAuthenticator: Send + Sync {
    async fn bearer_info(&self, token: &str) -> Result<BearerInfo, BearerInfoError>;
}

/// HTTP client for the identity service's user info endpoint.
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// # Arguments
    /// * `base_url` - Product API base URL (e.g., "https://api.example.com")
    /// * `timeout` - Per request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create identity HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn userinfo_url(&self) -> String {
        format!("{}{}", self.base_url, USERINFO_PATH)
    }
}

#[async_trait]
impl BearerAuthenticator for IdentityClient {
    async fn bearer_info(&self, token: &str) -> Result<BearerInfo, BearerInfoError> {
        let response = self
            .client
            .get(self.userinfo_url())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BearerInfoError::Request(e.to_string()))?;

        if response.status() != StatusCode::OK {
            debug!("Identity service answered {}", response.status());
            return Err(BearerInfoError::Unauthorized);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BearerInfoError::Request(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| BearerInfoError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> IdentityClient {
        IdentityClient::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_userinfo_url_trims_trailing_slash() {
        let client = IdentityClient::new("https://api.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.userinfo_url(),
            "https://api.example.com/launchpad/v1/userinfo.json"
        );
    }

    #[test]
    fn test_bearer_info_decodes_missing_meta() {
        let info: BearerInfo = serde_json::from_str(
            r#"{"user_id":1,"installation_id":2,"awsRegion":"us-east-1","url":"https://t.example.com"}"#,
        )
        .unwrap();
        assert_eq!(info.region, "us-east-1");
        assert!(info.meta.scopes.is_empty());
    }

    #[tokio::test]
    async fn test_bearer_info_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/launchpad/v1/userinfo.json"))
            .and(header("Authorization", "Bearer xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user_id": 42,
                "installation_id": 7,
                "awsRegion": "us-east-1",
                "url": "https://tenant.example.com",
                "meta": { "scopes": ["projects", "desk"] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let info = client(&server).bearer_info("xyz").await.unwrap();
        assert_eq!(info.user_id, 42);
        assert_eq!(info.installation_id, 7);
        assert_eq!(info.url, "https://tenant.example.com");
        assert_eq!(info.meta.scopes, vec!["projects", "desk"]);
    }

    #[tokio::test]
    async fn test_bearer_info_forbidden_is_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/launchpad/v1/userinfo.json"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client(&server).bearer_info("xyz").await.unwrap_err();
        assert!(matches!(err, BearerInfoError::Unauthorized));
    }

    #[tokio::test]
    async fn test_bearer_info_garbage_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/launchpad/v1/userinfo.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).bearer_info("xyz").await.unwrap_err();
        assert!(matches!(err, BearerInfoError::Decode(_)));
    }

    #[tokio::test]
    async fn test_bearer_info_unreachable_is_request_error() {
        let client = IdentityClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client.bearer_info("xyz").await.unwrap_err();
        assert!(matches!(err, BearerInfoError::Request(_)));
    }
}
