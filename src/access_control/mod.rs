//! Access control module
//!
//! Decides whether a role may perform a request, based on a hierarchical rule
//! table loaded once at startup.
//!
//! ## Rule Model
//!
//! Rules are grouped by role and matched in declaration order:
//!
//! 1. For each rule, its `subroutes` are tried first, with the rule's route as
//!    prefix (unless the route is `*`, which never descends)
//! 2. Then the rule's own route is tried
//! 3. The first matching rule decides: it allows the request only when its
//!    `methods` include the request method and its `action` is `allow`
//!
//! A request whose role has no rules, or where no rule matches, is denied.
//!
//! ## Example Rule File
//!
//! ```json
//! {
//!   "admin": [{ "route": "*", "methods": "*", "action": "allow" }],
//!   "user": [
//!     {
//!       "route": "/projects/:id",
//!       "methods": ["GET"],
//!       "action": "allow",
//!       "subroutes": [{ "route": "files/*", "methods": ["GET", "PUT"], "action": "allow" }]
//!     }
//!   ]
//! }
//! ```

pub mod patterns;
pub mod resolver;
pub mod table;
pub mod types;

pub use patterns::{RoutePattern, matches_route, matches_segment};
pub use resolver::{Acl, resolve};
pub use table::{CompiledRule, RuleTable, build_table};
pub use types::{Action, Decision, Methods, RequestView, Rule, RuleDocument};
