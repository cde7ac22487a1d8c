//! URI checks applied before any handler runs, regardless of which of the
//! three embedded servers is serving the request.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const FORBIDDEN_SUFFIXES: &[&str] = &[".key", ".crt", ".pem", ".csr"];

/// `true` if this URI must be refused with 403: a TLS credential file, or
/// a traversal attempt out of the served root.
pub fn is_forbidden(uri: &str) -> bool {
    FORBIDDEN_SUFFIXES.iter().any(|suf| uri.ends_with(suf)) || uri.contains("../")
}

/// Middleware applied ahead of every route on all three servers.
pub async fn reject_forbidden_uris(request: Request, next: Next) -> Response {
    if is_forbidden(request.uri().path()) {
        StatusCode::FORBIDDEN.into_response()
    } else {
        next.run(request).await
    }
}
