//! Axum middleware enforcing the ACL
//!
//! Projects each request onto a [`RequestView`] (method, decoded path, role
//! header), asks the [`Acl`] for a decision, and either forwards the request
//! or answers with the authorization failure.
//!
//! ```ignore
//! let acl = Arc::new(Acl::new(&settings)?);
//! let app = Router::new()
//!     .route("/projects/{id}", get(handler))
//!     .layer(middleware::from_fn_with_state(acl, authorize));
//! ```

use crate::access_control::{Acl, RequestView};
use crate::error::UnauthorizedError;
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Role a request was authorized under, available to downstream handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role(pub String);

/// Percent-decode a request path one segment at a time
///
/// The router dispatches on the undecoded path, so an encoded `/` must not
/// introduce a segment boundary. Segments that decode to something containing
/// `/`, or that are not valid UTF-8 once decoded, are kept as sent.
pub fn decode_path(raw_path: &str) -> String {
    raw_path
        .split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) if !decoded.contains('/') => decoded.into_owned(),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the view the decision needs from an HTTP request
pub fn request_view(acl: &Acl, request: &Request) -> RequestView {
    let path = decode_path(request.uri().path());

    let role = request
        .headers()
        .get(acl.role_header())
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    RequestView {
        method: request.method().as_str().to_string(),
        path,
        role,
    }
}

/// ACL middleware, for use with `axum::middleware::from_fn_with_state`
pub async fn authorize(
    State(acl): State<Arc<Acl>>,
    mut request: Request,
    next: Next,
) -> Result<Response, UnauthorizedError> {
    let mut view = request_view(&acl, &request);
    let had_role = view.role.is_some();

    if let Err(err) = acl.require(&mut view) {
        warn!(
            method = %view.method,
            path = %view.path,
            role = ?view.role,
            status = err.status,
            "{}",
            err
        );
        return Err(err);
    }

    if let Some(role) = view.role {
        // A default role was assigned; make it visible downstream
        if !had_role && let Ok(value) = HeaderValue::from_str(&role) {
            debug!(role = %role, "Writing default role onto request");
            if let Ok(name) = HeaderName::try_from(acl.role_header()) {
                request.headers_mut().insert(name, value);
            }
        }
        request.extensions_mut().insert(Role(role));
    }

    Ok(next.run(request).await)
}
