//! Route pattern matching for access control
//!
//! Routes use Express-style syntax:
//! - literal segments match themselves exactly (case-sensitive)
//! - `:name` segments match any non-empty segment (nothing is captured)
//! - `*` matches any non-empty segment; as the final segment it also absorbs
//!   every remaining segment of the request path, at least one of which must
//!   be non-empty
//! - the whole route `*` matches every path

/// Wildcard token, both as a full route and as a segment
pub const WILDCARD: &str = "*";

/// Check a single path segment against a single pattern segment
pub fn matches_segment(path_segment: &str, pattern_segment: &str) -> bool {
    if pattern_segment.starts_with(':') || pattern_segment == WILDCARD {
        return !path_segment.is_empty();
    }

    path_segment == pattern_segment
}

/// Check a request path against a route pattern
pub fn matches_route(request_path: &str, route_pattern: &str) -> bool {
    RoutePattern::new(route_pattern).matches(request_path)
}

/// Strip one leading and one trailing `/`, then split into segments.
///
/// The empty string (and therefore `/`) yields no segments.
pub fn segments(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);

    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Join a parent prefix and a child route, collapsing runs of `/`
pub fn join_route(prefix: &str, route: &str) -> String {
    let joined = format!("{}/{}", prefix, route);
    let mut collapsed = String::with_capacity(joined.len());

    for c in joined.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed
}

/// Compiled route pattern
///
/// Segments are split once, when the rule table is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternKind {
    /// The route `*`: matches every path
    Any,
    /// Fixed number of segments
    Exact(Vec<String>),
    /// Leading segments followed by a trailing `*`
    Prefix(Vec<String>),
}

impl RoutePattern {
    pub fn new(route: &str) -> Self {
        let kind = if route == WILDCARD {
            PatternKind::Any
        } else {
            let mut parts: Vec<String> = segments(route).into_iter().map(String::from).collect();
            if parts.last().is_some_and(|last| last == WILDCARD) {
                parts.pop();
                PatternKind::Prefix(parts)
            } else {
                PatternKind::Exact(parts)
            }
        };

        Self {
            source: route.to_string(),
            kind,
        }
    }

    /// The route this pattern was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check if this is the catch-all `*` route
    pub fn is_any(&self) -> bool {
        matches!(self.kind, PatternKind::Any)
    }

    pub fn matches(&self, request_path: &str) -> bool {
        let path = segments(request_path);

        match &self.kind {
            PatternKind::Any => true,
            PatternKind::Exact(route) => path.len() == route.len() && all_match(&path, route),
            // The wildcard needs at least one non-empty segment to absorb
            PatternKind::Prefix(route) => {
                path.len() > route.len()
                    && all_match(&path, route)
                    && path[route.len()..].iter().any(|s| !s.is_empty())
            }
        }
    }
}

fn all_match(path: &[&str], route: &[String]) -> bool {
    route
        .iter()
        .zip(path)
        .all(|(pattern, segment)| matches_segment(segment, pattern))
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
