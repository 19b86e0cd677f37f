//! Route ACL
//!
//! Role-based access control for HTTP routes, driven by a hierarchical rule
//! file loaded once at startup.
//!
//! ## Features
//!
//! - **Express-style route patterns** - literal segments, `:param` placeholders,
//!   trailing `*` wildcards
//! - **Nested subroutes** - child rules inherit their parent's route as prefix
//! - **First match wins** - declaration order is the only tie-break
//! - **Axum middleware** - drop-in layer with default role assignment
//!
//! ## Decision Flow
//!
//! ```text
//! role (or default role) → matching rule → method + action → allow / deny
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! [acl]
//! rules_path = "rules.json"
//! role_key = "user"               # role read from the x-user-role header
//! default_role = "guest"
//!
//! [server]
//! port = 20390
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod middleware;

// Re-export main types
pub use access_control::{Acl, Decision, RequestView, RuleTable};
pub use config::{AclSettings, AppConfig, load_config};
pub use error::{AppError, ConfigError, UnauthorizedError};
