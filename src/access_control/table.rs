//! Rule table construction
//!
//! Turns a rule document into an immutable, role-indexed tree of compiled
//! rules. Each rule's effective route (its parents' routes joined in front of
//! its own) is computed and compiled here, once.

use crate::access_control::patterns::{RoutePattern, WILDCARD, join_route};
use crate::access_control::types::{Rule, RuleDocument};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Immutable rule table, built once at startup
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    roles: HashMap<String, Vec<CompiledRule>>,
}

/// A rule with its effective route compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    pattern: RoutePattern,
    children: Vec<CompiledRule>,
}

impl CompiledRule {
    fn compile(rule: Rule, prefix: Option<&str>, location: &str) -> Result<Self, ConfigError> {
        if rule.route.is_empty() {
            return Err(ConfigError::invalid(format!(
                "{}: route must not be empty",
                location
            )));
        }

        let effective = match prefix {
            Some(prefix) => join_route(prefix, &rule.route),
            None => rule.route.clone(),
        };

        // A `*` route is terminal; its subroutes are never consulted
        let children = match &rule.subroutes {
            Some(subroutes) if rule.route != WILDCARD => subroutes
                .iter()
                .enumerate()
                .map(|(i, child)| {
                    CompiledRule::compile(
                        child.clone(),
                        Some(&effective),
                        &format!("{}.subroutes[{}]", location, i),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        Ok(Self {
            pattern: RoutePattern::new(&effective),
            rule,
            children,
        })
    }

    /// The rule as declared in the document
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The rule's route with all parent prefixes applied
    pub fn effective_route(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn children(&self) -> &[CompiledRule] {
        &self.children
    }
}

/// Build a rule table from a parsed document
pub fn build_table(document: RuleDocument) -> Result<RuleTable, ConfigError> {
    let mut roles = HashMap::with_capacity(document.len());

    for (role, rules) in document {
        let compiled = rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| CompiledRule::compile(rule, None, &format!("{}[{}]", role, i)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(role = %role, rules = compiled.len(), "Compiled rules for role");
        roles.insert(role, compiled);
    }

    Ok(RuleTable { roles })
}

impl RuleTable {
    /// Build from an already-deserialized structured value
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let document: RuleDocument = serde_json::from_value(value).map_err(invalid_document)?;
        build_table(document)
    }

    /// Parse a JSON rule document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let document: RuleDocument = serde_json::from_str(json).map_err(invalid_document)?;
        build_table(document)
    }

    /// Parse a TOML rule document (a table of role arrays)
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let document: RuleDocument = toml::from_str(toml_str).map_err(invalid_document)?;
        build_table(document)
    }

    /// Read and parse a rule file
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Load(format!(
                "Could not read rules file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let table = if is_toml {
            Self::from_toml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        if table.is_empty() {
            warn!(
                path = %path.display(),
                "Rule file defines no roles; every request will be denied"
            );
        }

        info!(
            path = %path.display(),
            roles = ?table.role_names(),
            "Loaded ACL rules"
        );

        Ok(table)
    }

    /// Rules for a role, or `None` when the role has no entry
    pub fn rules_for(&self, role: &str) -> Option<&[CompiledRule]> {
        self.roles.get(role).map(Vec::as_slice)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Role names in sorted order
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles().collect();
        names.sort_unstable();
        names
    }
}

fn invalid_document(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::invalid(format!(
        "Invalid rule file given. Make sure the file is a proper JSON: {}",
        e
    ))
}
