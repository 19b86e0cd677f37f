//! Access control types
//!
//! Core types used by the access control system: the rule document as it is
//! deserialized, and the per-request view and decision.

use crate::error::UnauthorizedError;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

use super::patterns::WILDCARD;

/// Rule document: role name to the ordered top-level rules for that role
pub type RuleDocument = HashMap<String, Vec<Rule>>;

/// A single rule, possibly with nested subroutes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    /// Express-style route pattern, relative to the parent rule's route
    pub route: String,

    /// Methods this rule applies to
    pub methods: Methods,

    /// What happens when the rule applies
    pub action: Action,

    /// Child rules, matched with this rule's route as prefix
    #[serde(default)]
    pub subroutes: Option<Vec<Rule>>,
}

impl Rule {
    pub fn new(route: impl Into<String>, methods: Methods, action: Action) -> Self {
        Self {
            route: route.into(),
            methods,
            action,
            subroutes: None,
        }
    }

    pub fn with_subroutes(mut self, subroutes: Vec<Rule>) -> Self {
        self.subroutes = Some(subroutes);
        self
    }

    /// Check if the rule permits the given method
    ///
    /// A `deny` rule never permits, even when the method is listed.
    pub fn permits(&self, method: &str) -> bool {
        self.methods.contains(method) && self.action == Action::Allow
    }
}

/// HTTP methods a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Methods {
    /// `"*"`: every method
    Any,
    /// Explicit list of method tokens, compared exactly
    List(Vec<String>),
}

impl Methods {
    pub fn list<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Methods::List(methods.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, method: &str) -> bool {
        match self {
            Methods::Any => true,
            Methods::List(methods) => methods.iter().any(|m| m == method),
        }
    }
}

impl<'de> Deserialize<'de> for Methods {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Token(String),
            List(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Token(token) if token == WILDCARD => Ok(Methods::Any),
            Raw::Token(token) => Err(serde::de::Error::custom(format!(
                "methods must be \"*\" or a list of methods, got \"{}\"",
                token
            ))),
            Raw::List(methods) if methods.is_empty() => Err(serde::de::Error::custom(
                "methods list must not be empty",
            )),
            Raw::List(methods) => Ok(Methods::List(methods)),
        }
    }
}

/// Rule action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Deny,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Deny => "deny",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The parts of a request the decision needs
///
/// Built by the hosting pipeline. `path` is expected to be decoded already.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestView {
    pub method: String,
    pub path: String,
    pub role: Option<String>,
}

impl RequestView {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Result of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed
    Allow,
    /// The request is refused
    Deny(UnauthorizedError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Deny(_))
    }

    /// Convert into a `Result`, for use with `?`
    pub fn into_result(self) -> Result<(), UnauthorizedError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wildcard_methods() {
        let methods: Methods = serde_json::from_str(r#""*""#).unwrap();
        assert_eq!(methods, Methods::Any);
        assert!(methods.contains("DELETE"));
    }

    #[test]
    fn test_deserialize_method_list() {
        let methods: Methods = serde_json::from_str(r#"["GET", "POST"]"#).unwrap();
        assert!(methods.contains("GET"));
        assert!(methods.contains("POST"));
        assert!(!methods.contains("PUT"));
        assert!(!methods.contains("get"));
    }

    #[test]
    fn test_reject_bad_methods() {
        assert!(serde_json::from_str::<Methods>(r#""GET""#).is_err());
        assert!(serde_json::from_str::<Methods>("[]").is_err());
        assert!(serde_json::from_str::<Methods>("42").is_err());
    }

    #[test]
    fn test_deserialize_action() {
        let action: Action = serde_json::from_str(r#""allow""#).unwrap();
        assert_eq!(action, Action::Allow);

        let action: Action = serde_json::from_str(r#""deny""#).unwrap();
        assert_eq!(action, Action::Deny);

        assert!(serde_json::from_str::<Action>(r#""maybe""#).is_err());
    }

    #[test]
    fn test_rule_missing_field() {
        let err = serde_json::from_str::<Rule>(r#"{"route": "/a", "methods": "*"}"#).unwrap_err();
        assert!(err.to_string().contains("action"));
    }

    #[test]
    fn test_rule_permits() {
        let rule = Rule::new("/a", Methods::list(["GET"]), Action::Allow);
        assert!(rule.permits("GET"));
        assert!(!rule.permits("POST"));

        let rule = Rule::new("/a", Methods::Any, Action::Deny);
        assert!(!rule.permits("GET"));
    }
}
