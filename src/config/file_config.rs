use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub bind_address: Option<String>,
    pub deployment_region: Option<String>,
    pub mcp_url: Option<String>,
    pub api_url: Option<String>,
    pub resource_documentation: Option<String>,
    pub toolsets: Option<String>,
    pub read_only: Option<bool>,
    pub logging_level: Option<String>,
    pub identity_timeout_sec: Option<u64>,
    pub max_unauthenticated_body_bytes: Option<usize>,

    pub scope_filter: Option<ScopeFilterConfig>,
}

/// `[scope_filter.prefixes]` maps a tool name prefix to the scope required to see it.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ScopeFilterConfig {
    pub prefixes: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_address = "127.0.0.1:9000"
deployment_region = "eu-west-1"
api_url = "https://api.example.com"
toolsets = "server"
read_only = true
logging_level = "headers"
identity_timeout_sec = 3
max_unauthenticated_body_bytes = 4096

[scope_filter.prefixes]
projects_ = "projects"
desk_ = "desk"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.bind_address.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(config.deployment_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.read_only, Some(true));
        assert_eq!(config.identity_timeout_sec, Some(3));
        assert_eq!(config.max_unauthenticated_body_bytes, Some(4096));
        let prefixes = config.scope_filter.unwrap().prefixes;
        assert_eq!(prefixes.get("desk_").map(String::as_str), Some("desk"));
        assert_eq!(prefixes.len(), 2);
    }

    #[test]
    fn test_load_empty_config() {
        let file = NamedTempFile::new().unwrap();
        let config = FileConfig::load(file.path()).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.scope_filter.is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "read_only = [").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
