//! Access control resolver
//!
//! Finds the rule that applies to a request and turns it into a decision.
//!
//! Resolution is depth-first and declaration-ordered: for each rule of the
//! role, its subroutes are tried before the rule's own route, and both before
//! the next sibling. The first effective route that matches wins.

use crate::access_control::table::{CompiledRule, RuleTable};
use crate::access_control::types::{Decision, RequestView, Rule};
use crate::config::AclSettings;
use crate::error::{ConfigError, UnauthorizedError};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Find the most specific rule for `role` on `path`
pub fn resolve<'a>(table: &'a RuleTable, role: &str, path: &str) -> Option<&'a CompiledRule> {
    table
        .rules_for(role)
        .and_then(|rules| find_rule(rules, path))
}

fn find_rule<'a>(rules: &'a [CompiledRule], path: &str) -> Option<&'a CompiledRule> {
    for rule in rules {
        if let Some(found) = find_rule(rule.children(), path) {
            return Some(found);
        }

        if rule.pattern().matches(path) {
            trace!(route = rule.effective_route(), "Route matched");
            return Some(rule);
        }
    }

    None
}

/// Authorization service
///
/// Holds the rule table and the settings the decision needs. Build it once at
/// startup and share it (e.g. behind an `Arc`); it is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Acl {
    rules_path: Option<PathBuf>,
    table: RuleTable,
    role_key: String,
    default_role: Option<String>,
}

impl Acl {
    /// Load the rule file named by `settings` and build the service
    pub fn new(settings: &AclSettings) -> Result<Self, ConfigError> {
        let rules_path = settings
            .rules_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::missing("acl.rules_path"))?;
        settings.validate_role_key()?;

        let expanded = shellexpand::tilde(rules_path);
        let table = RuleTable::from_path(expanded.as_ref())?;

        Ok(Self {
            rules_path: Some(PathBuf::from(expanded.as_ref())),
            ..Self::from_table(table, settings)
        })
    }

    /// Build the service around an already-built table
    pub fn from_table(table: RuleTable, settings: &AclSettings) -> Self {
        Self {
            rules_path: None,
            table,
            role_key: settings.role_key.clone(),
            default_role: settings.effective_default_role().map(String::from),
        }
    }

    /// Path the rules were loaded from, if they came from a file
    pub fn rules_path(&self) -> Option<&std::path::Path> {
        self.rules_path.as_deref()
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn role_key(&self) -> &str {
        &self.role_key
    }

    pub fn default_role(&self) -> Option<&str> {
        self.default_role.as_deref()
    }

    /// Request header the hosting pipeline reads the role from
    pub fn role_header(&self) -> String {
        format!("x-{}-role", self.role_key.to_ascii_lowercase())
    }

    /// Find the rule that applies to `role` on `path`
    pub fn resolve(&self, role: &str, path: &str) -> Option<&Rule> {
        resolve(&self.table, role, path).map(CompiledRule::rule)
    }

    /// Decide whether the request may proceed
    ///
    /// When the view carries no role and a default role is configured, the
    /// default is written back onto the view.
    pub fn authorize(&self, request: &mut RequestView) -> Decision {
        debug!(path = %request.path, method = %request.method, "Authorizing request");

        let role = match request.role.as_deref().filter(|r| !r.is_empty()) {
            Some(role) => role.to_string(),
            None => match &self.default_role {
                Some(default_role) => {
                    trace!(role = %default_role, "Assigning default role");
                    request.role = Some(default_role.clone());
                    default_role.clone()
                }
                None => return Decision::Deny(UnauthorizedError::no_role()),
            },
        };

        let Some(rule) = self.resolve(&role, &request.path) else {
            let err = UnauthorizedError::no_matching_rule(&role, &request.path);
            debug!(role = %role, "{}", err);
            return Decision::Deny(err);
        };

        debug!(
            role = %role,
            route = %rule.route,
            action = %rule.action,
            "Resolved rule"
        );

        if rule.permits(&request.method) {
            Decision::Allow
        } else {
            Decision::Deny(UnauthorizedError::bare())
        }
    }

    /// Decide whether the request may proceed, returning an error if denied
    pub fn require(&self, request: &mut RequestView) -> Result<(), UnauthorizedError> {
        self.authorize(request).into_result()
    }
}
