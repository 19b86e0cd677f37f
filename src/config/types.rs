//! Configuration types for route-acl
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::error::ConfigError;
use axum::http::HeaderName;
use serde::Deserialize;

/// Default port for the guarded HTTP server
pub const DEFAULT_SERVER_PORT: u16 = 20390;

/// Default key naming where the role lives on a request
pub const DEFAULT_ROLE_KEY: &str = "user";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ACL settings; required by `load_config`
    pub acl: Option<AclSettings>,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// ACL initialization settings
///
/// ```toml
/// [acl]
/// rules_path = "rules.json"
/// role_key = "user"          # role header becomes x-user-role
/// default_role = "guest"     # used when a request carries no role
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AclSettings {
    /// Path to the rule document (JSON, or TOML by extension)
    pub rules_path: Option<String>,

    /// Key naming where the role is found on an inbound request
    pub role_key: String,

    /// Role assigned to requests that carry none
    pub default_role: Option<String>,
}

impl Default for AclSettings {
    fn default() -> Self {
        Self {
            rules_path: None,
            role_key: DEFAULT_ROLE_KEY.to_string(),
            default_role: None,
        }
    }
}

impl AclSettings {
    pub fn new(rules_path: impl Into<String>) -> Self {
        Self {
            rules_path: Some(rules_path.into()),
            ..Default::default()
        }
    }

    /// The default role, treating an empty string as unset
    pub fn effective_default_role(&self) -> Option<&str> {
        self.default_role.as_deref().filter(|r| !r.is_empty())
    }

    /// Header carrying the role: `x-<role_key>-role`, lowercased
    pub fn role_header(&self) -> String {
        format!("x-{}-role", self.role_key.to_ascii_lowercase())
    }

    /// Check that `role_key` yields a valid HTTP header name
    pub fn validate_role_key(&self) -> Result<(), ConfigError> {
        if self.role_key.trim().is_empty() {
            return Err(ConfigError::invalid("acl.role_key must not be empty"));
        }

        let header = self.role_header();
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigError::invalid(format!(
                "acl.role_key '{}' does not form a valid header name ('{}')",
                self.role_key, header
            ))
        })?;

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
