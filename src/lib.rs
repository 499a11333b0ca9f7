//! Route template compiler and request matcher.
//!
//! Routes are declared as URI templates with named placeholders
//! (`users/{id}`, `posts/{slug?}`, `{account}.example.com`), compiled into
//! anchored regular expressions, and resolved against incoming requests by
//! verb, path, scheme and host.

pub mod config;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::HttpServer;
pub use routing::{MatchRequest, Route, RouteCollection, RouteError, RouteLookup, Router};
