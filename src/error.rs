//! Error types for route-acl
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to HTTP responses at the middleware boundary.

pub mod http_mapper;

use thiserror::Error;

/// Default HTTP status carried by an authorization failure
pub const DEFAULT_UNAUTHORIZED_STATUS: u16 = 403;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-related errors
///
/// Raised only while loading settings or building the rule table; every
/// variant is fatal to startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        ConfigError::Missing {
            field: field.into(),
        }
    }
}

/// Authorization failure returned by a decision call
///
/// The three causes (no role, no matching rule, rule denies) are told apart
/// by `reason` only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unauthorized{}", .reason.as_deref().map(|r| format!(" - {r}")).unwrap_or_default())]
pub struct UnauthorizedError {
    pub reason: Option<String>,
    pub status: u16,
}

impl UnauthorizedError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            status: DEFAULT_UNAUTHORIZED_STATUS,
        }
    }

    /// Failure without a reason (the matched rule denies the request)
    pub fn bare() -> Self {
        Self {
            reason: None,
            status: DEFAULT_UNAUTHORIZED_STATUS,
        }
    }

    pub fn no_role() -> Self {
        Self::new("No Role found")
    }

    pub fn no_matching_rule(role: &str, path: &str) -> Self {
        Self::new(format!("No matching rule found for '{}' on '{}'", role, path))
    }

    /// Override the status carried by this failure
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}
