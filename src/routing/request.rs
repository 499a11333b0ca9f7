//! Request abstraction consumed by the matcher.
//!
//! The transport layer implements [`RouteRequest`]; the core never touches
//! sockets or headers. [`MatchRequest`] is the owned implementation used by
//! the HTTP layer, the CLI and tests.

use axum::http::Method;

/// The four facts about a request that routing depends on.
pub trait RouteRequest {
    /// Upper-case HTTP verb.
    fn method(&self) -> &Method;

    /// Path with surrounding slashes trimmed, `/` for the root.
    fn path(&self) -> &str;

    /// Lower-cased host without port, empty when unknown.
    fn host(&self) -> &str;

    /// Whether the request arrived over TLS.
    fn is_secure(&self) -> bool;
}

/// An owned, already-normalized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    method: Method,
    path: String,
    host: String,
    secure: bool,
}

impl MatchRequest {
    /// Create a request for `method` and `path`.
    ///
    /// The path is trimmed of `/` on both ends; an empty result becomes `/`.
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: normalize_path(path),
            host: String::new(),
            secure: false,
        }
    }

    /// Set the host; it is lower-cased and any `:port` suffix is dropped.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = normalize_host(host);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl RouteRequest for MatchRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn is_secure(&self) -> bool {
        self.secure
    }
}

/// Trim `/` from both ends, `/` when nothing is left.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lower-case, trim and strip a trailing numeric port.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    };
    host.to_ascii_lowercase()
}

/// The request path as the compiled expressions expect it: one leading `/`.
pub fn matchable_path<R: RouteRequest + ?Sized>(request: &R) -> String {
    let path = request.path();
    if path == "/" {
        path.to_string()
    } else {
        format!("/{}", path.trim_start_matches('/'))
    }
}
