//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the route
//! server. All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, scheme detection).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Top-level route definitions.
    pub routes: Vec<RouteConfig>,

    /// Route groups sharing a prefix, name prefix, domain or middleware.
    pub groups: Vec<GroupConfig>,

    /// Catch-all route tried after every other route.
    pub fallback: Option<FallbackConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Treat `X-Forwarded-Proto: https` as a secure request.
    pub trust_forwarded_proto: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trust_forwarded_proto: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "route_engine=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// A single route definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Verbs the route answers; `ANY` expands to every verb.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// URI template, e.g. `users/{id}`.
    pub uri: String,

    /// Route name for lookups.
    #[serde(default)]
    pub name: Option<String>,

    /// Host template, e.g. `{account}.example.com`.
    #[serde(default)]
    pub domain: Option<String>,

    /// Handler identifier reported when the route matches.
    #[serde(default)]
    pub action: Option<String>,

    /// Per-variable requirements.
    #[serde(default, rename = "where")]
    pub wheres: HashMap<String, String>,

    /// Per-variable defaults.
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    #[serde(default)]
    pub middleware: Vec<String>,

    /// `any`, `http` or `https`.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Try this route only after every other route.
    #[serde(default)]
    pub fallback: bool,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

fn default_scheme() -> String {
    "any".to_string()
}

/// A route group.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    pub prefix: Option<String>,

    /// Name prefix applied to every route in the group.
    #[serde(rename = "as")]
    pub name: Option<String>,

    pub domain: Option<String>,

    pub middleware: Vec<String>,

    #[serde(rename = "where")]
    pub wheres: HashMap<String, String>,

    pub routes: Vec<RouteConfig>,

    /// Nested groups.
    pub groups: Vec<GroupConfig>,
}

/// The catch-all route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    pub action: String,

    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
}
