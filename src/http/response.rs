//! Response mapping.
//!
//! # Responsibilities
//! - Map lookup outcomes to HTTP status codes
//! - Add the `Allow` header to OPTIONS and 405 responses
//! - Describe the matched route and its parameters as JSON
//!
//! # Design Decisions
//! - A route without an action is a server error, not a miss
//! - Compile failures surface as 500 and are logged by the router

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::routing::{BoundRoute, RouteLookup, RouteResult};

/// JSON description of a bound route.
pub fn describe_route(bound: &BoundRoute<'_>) -> Value {
    let route = bound.route();
    json!({
        "action": route.action(),
        "name": route.route_name(),
        "uri": route.uri(),
        "domain": route.domain(),
        "methods": route.methods().iter().map(|m| m.as_str()).collect::<Vec<_>>(),
        "middleware": route.middlewares(),
        "parameters": bound.parameters(),
    })
}

/// Convert a dispatch result into a response.
pub fn lookup_response(result: RouteResult<RouteLookup<'_>>) -> Response {
    match result {
        Ok(RouteLookup::Matched(bound)) => {
            if bound.route().action().is_none() {
                let message = format!("Route for [{}] has no action.", bound.route().uri());
                tracing::error!(uri = %bound.route().uri(), "Matched route has no action");
                return (StatusCode::INTERNAL_SERVER_ERROR, message).into_response();
            }
            (StatusCode::OK, Json(describe_route(&bound))).into_response()
        }
        Ok(RouteLookup::Options { allowed }) => {
            (StatusCode::OK, [(header::ALLOW, allowed.header_value())]).into_response()
        }
        Ok(RouteLookup::MethodNotAllowed { allowed }) => (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, allowed.header_value())],
            "Method not allowed",
        )
            .into_response(),
        Ok(RouteLookup::NotFound) => (StatusCode::NOT_FOUND, "No matching route found").into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{MatchRequest, Route, RouteCollection};
    use axum::http::Method;

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let mut routes = RouteCollection::new();
        routes.add(Route::new(["GET"], "widgets"));

        let request = MatchRequest::new(Method::POST, "/widgets");
        let response = lookup_response(routes.match_request(&request));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");
    }

    #[test]
    fn test_missing_action_is_server_error() {
        let mut routes = RouteCollection::new();
        routes.add(Route::new(["GET"], "bare"));

        let request = MatchRequest::new(Method::GET, "/bare");
        let response = lookup_response(routes.match_request(&request));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_describe_route() {
        let mut routes = RouteCollection::new();
        routes
            .add(Route::new(["GET"], "users/{id}"))
            .set_action("users.show")
            .name("users.show");

        let request = MatchRequest::new(Method::GET, "/users/3");
        let bound = routes.match_request(&request).unwrap().matched().unwrap();
        let body = describe_route(&bound);
        assert_eq!(body["action"], "users.show");
        assert_eq!(body["parameters"]["id"], "3");
        assert_eq!(body["methods"], json!(["GET", "HEAD"]));
    }
}
