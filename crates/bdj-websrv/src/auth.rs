//! HTTP Basic auth, checked against configured credentials rather than a
//! user database — every one of these servers has exactly one account.

use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, Clone)]
pub struct BasicAuthConfig {
    pub user: String,
    pub password: String,
    pub realm: &'static str,
}

impl BasicAuthConfig {
    fn challenge(&self) -> Response {
        let mut resp = StatusCode::UNAUTHORIZED.into_response();
        let value = format!("Basic realm=\"{}\"", self.realm);
        resp.headers_mut()
            .insert(header::WWW_AUTHENTICATE, value.parse().unwrap());
        resp
    }

    fn accepts(&self, header_value: &str) -> bool {
        let Some(encoded) = header_value.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded) else {
            return false;
        };
        let Ok(text) = String::from_utf8(decoded) else {
            return false;
        };
        let Some((user, pass)) = text.split_once(':') else {
            return false;
        };
        user == self.user && pass == self.password
    }
}

/// Middleware: reject with 401 + `WWW-Authenticate` unless the request
/// carries valid Basic credentials for this server's configured account.
pub async fn require_basic_auth(
    State(cfg): State<BasicAuthConfig>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ok = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| cfg.accepts(v))
        .unwrap_or(false);

    if ok {
        next.run(request).await
    } else {
        cfg.challenge()
    }
}
