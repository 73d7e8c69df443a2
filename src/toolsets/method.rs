use std::collections::HashSet;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use super::ToolsetError;

/// Sentinel method that stands for every toolset.
pub const METHOD_ALL: &str = "all";

/// Identifier of a toolset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Method(String);

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn all() -> Self {
        Self(METHOD_ALL.to_string())
    }

    pub fn is_all(&self) -> bool {
        self.0 == METHOD_ALL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Method {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// The set of toolset methods known to this process.
///
/// Built once at startup and shared by handle. Registration is additive and
/// idempotent; nothing is ever removed.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: RwLock<HashSet<Method>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_method(&self, method: impl Into<Method>) {
        self.methods
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method.into());
    }

    /// `all` is always considered registered.
    pub fn is_registered(&self, method: &Method) -> bool {
        method.is_all()
            || self
                .methods
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(method)
    }

    pub fn registered_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        methods.sort();
        methods
    }

    /// Parse a comma separated list of toolset names.
    ///
    /// Blank items are skipped; an input with no names selects `all`. Every
    /// unregistered name is reported at once.
    pub fn parse_methods(&self, input: &str) -> Result<Vec<Method>, ToolsetError> {
        let methods: Vec<Method> = input
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(Method::from)
            .collect();

        if methods.is_empty() {
            return Ok(vec![Method::all()]);
        }

        let unknown: Vec<String> = methods
            .iter()
            .filter(|method| !self.is_registered(method))
            .map(|method| method.to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(ToolsetError::InvalidMethods(unknown));
        }

        Ok(methods)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_all_is_always_registered() {
        let registry = MethodRegistry::new();
        assert!(registry.is_registered(&Method::all()));
        assert!(!registry.is_registered(&Method::from("projects")));
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = MethodRegistry::new();
        registry.register_method("projects");
        registry.register_method("projects");
        assert_eq!(registry.registered_methods(), vec![Method::from("projects")]);
    }

    #[test]
    fn test_registered_methods_sorted() {
        let registry = MethodRegistry::new();
        registry.register_method("server");
        registry.register_method("desk");
        registry.register_method("projects");
        let names: Vec<String> = registry
            .registered_methods()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["desk", "projects", "server"]);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(MethodRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.register_method(format!("m{}", i % 4));
                    registry.is_registered(&Method::from("m0"))
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.registered_methods().len(), 4);
    }

    #[test]
    fn test_parse_methods_trims_and_accepts_registered() {
        let registry = MethodRegistry::new();
        registry.register_method("projects");
        registry.register_method("desk");
        let methods = registry.parse_methods(" projects, desk ,").unwrap();
        assert_eq!(methods, vec![Method::from("projects"), Method::from("desk")]);
    }

    #[test]
    fn test_parse_methods_empty_selects_all() {
        let registry = MethodRegistry::new();
        assert_eq!(registry.parse_methods("").unwrap(), vec![Method::all()]);
        assert_eq!(registry.parse_methods(" , ").unwrap(), vec![Method::all()]);
    }

    #[test]
    fn test_parse_methods_reports_every_unknown() {
        let registry = MethodRegistry::new();
        registry.register_method("projects");
        let err = registry.parse_methods("nope,projects,missing").unwrap_err();
        assert_eq!(
            err,
            ToolsetError::InvalidMethods(vec!["nope".to_string(), "missing".to_string()])
        );
        assert_eq!(err.to_string(), "invalid toolsets: nope, missing");
    }
}
