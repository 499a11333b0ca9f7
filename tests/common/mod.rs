//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use route_engine::config::{parse_config, AppConfig};
use route_engine::routing::{MatchRequest, Router};

/// Parse a TOML route table and build its router.
pub fn router_from_toml(toml: &str) -> (AppConfig, Router) {
    let config = parse_config(toml).expect("valid config");
    let router = Router::from_config(&config).expect("routes compile");
    (config, router)
}

pub fn request(method: Method, path: &str) -> MatchRequest {
    MatchRequest::new(method, path)
}

/// An HTTP request for `uri` carrying `host`.
pub fn http_request(method: Method, uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Host", host)
        .body(Body::empty())
        .expect("valid request")
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("JSON body")
}
