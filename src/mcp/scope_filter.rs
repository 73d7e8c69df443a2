//! Scope-based tool visibility.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A tool-name prefix that is only visible to callers holding `scope`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScopeRule {
    pub prefix: String,
    pub scope: String,
}

/// Hides tools from callers whose token lacks the scope mapped to the tool's
/// name prefix. Callers without any scopes see everything.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    rules: Vec<ScopeRule>,
}

impl ScopeFilter {
    pub fn new(rules: Vec<ScopeRule>) -> Self {
        Self { rules }
    }

    pub fn from_prefixes(prefixes: &BTreeMap<String, String>) -> Self {
        Self::new(
            prefixes
                .iter()
                .map(|(prefix, scope)| ScopeRule {
                    prefix: prefix.clone(),
                    scope: scope.clone(),
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn allows(&self, tool_name: &str, scopes: &[String]) -> bool {
        if scopes.is_empty() {
            return true;
        }
        self.rules
            .iter()
            .filter(|rule| tool_name.starts_with(&rule.prefix))
            .all(|rule| scopes.iter().any(|scope| scope == &rule.scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ScopeFilter {
        let mut prefixes = BTreeMap::new();
        prefixes.insert("projects_".to_string(), "projects".to_string());
        prefixes.insert("desk_".to_string(), "desk".to_string());
        ScopeFilter::from_prefixes(&prefixes)
    }

    #[test]
    fn test_no_scopes_sees_everything() {
        assert!(filter().allows("projects_list", &[]));
        assert!(filter().allows("desk_tickets", &[]));
    }

    #[test]
    fn test_missing_scope_hides_prefixed_tools() {
        let scopes = vec!["projects".to_string()];
        assert!(filter().allows("projects_list", &scopes));
        assert!(!filter().allows("desk_tickets", &scopes));
    }

    #[test]
    fn test_unprefixed_tools_always_visible() {
        let scopes = vec!["projects".to_string()];
        assert!(filter().allows("server_info", &scopes));
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let filter = ScopeFilter::default();
        assert!(filter.is_empty());
        assert!(filter.allows("desk_tickets", &["projects".to_string()]));
    }
}
