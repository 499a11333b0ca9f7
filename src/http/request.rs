//! Request adaptation.
//!
//! # Responsibilities
//! - Turn an HTTP request into the routing core's [`MatchRequest`]
//! - Decide whether the request is secure
//!
//! # Design Decisions
//! - Host header first, URI authority second
//! - The path is percent-decoded before matching; invalid UTF-8 is replaced
//! - `X-Forwarded-Proto` is only trusted when the listener says so

use axum::http::{header, Request};
use percent_encoding::percent_decode_str;

use crate::routing::MatchRequest;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Build the routing view of `request`.
pub fn to_match_request<B>(request: &Request<B>, trust_forwarded_proto: bool) -> MatchRequest {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    let path = percent_decode_str(request.uri().path()).decode_utf8_lossy();

    MatchRequest::new(request.method().clone(), &path)
        .with_host(host)
        .with_secure(is_secure(request, trust_forwarded_proto))
}

fn is_secure<B>(request: &Request<B>, trust_forwarded_proto: bool) -> bool {
    if request.uri().scheme_str() == Some("https") {
        return true;
    }
    trust_forwarded_proto
        && request
            .headers()
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}
