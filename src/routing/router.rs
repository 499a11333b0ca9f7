//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Register routes through verb helpers, groups and configuration
//! - Apply the enclosing group's prefix, name, domain, middleware and wheres
//! - Dispatch a request to its lookup outcome
//!
//! # Design Decisions
//! - Registration is single-threaded (`&mut self`); dispatch takes `&self`
//!   and may run from any number of threads
//! - Routes are fully configured before they are indexed, so the
//!   domain+uri key reflects the final definition
//! - Explicit outcome enum rather than silent default

use std::time::Instant;

use crate::config::schema::{AppConfig, GroupConfig, RouteConfig};
use crate::observability::metrics;
use crate::routing::bound::BoundRoute;
use crate::routing::collection::RouteCollection;
use crate::routing::error::RouteResult;
use crate::routing::group::GroupAttributes;
use crate::routing::lookup::{RouteLookup, VERBS};
use crate::routing::matcher::ValidatorChain;
use crate::routing::request::RouteRequest;
use crate::routing::route::Route;

const FALLBACK_PLACEHOLDER: &str = "fallbackPlaceholder";

/// Route table plus the group stack used while registering.
#[derive(Debug, Default)]
pub struct Router {
    routes: RouteCollection,
    group_stack: Vec<GroupAttributes>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validators(validators: ValidatorChain) -> Self {
        Self {
            routes: RouteCollection::with_validators(validators),
            group_stack: Vec::new(),
        }
    }

    /// Build and compile a router from configuration.
    pub fn from_config(config: &AppConfig) -> RouteResult<Self> {
        let mut router = Router::new();

        for route in &config.routes {
            router.register_config_route(route);
        }
        for group in &config.groups {
            router.register_config_group(group);
        }
        if let Some(fallback) = &config.fallback {
            router.fallback_for(&fallback.methods, &fallback.action);
        }

        router.routes.refresh_name_lookups();
        let compiled = router.compile_all()?;
        metrics::set_routes_registered(compiled);

        tracing::info!(
            routes = compiled,
            entries = router.routes.len(),
            "Route table built"
        );
        Ok(router)
    }

    fn register_config_route(&mut self, config: &RouteConfig) {
        let mut route = self.new_route(expand_methods(&config.methods), &config.uri, config.action.as_deref());

        if let Some(domain) = &config.domain {
            route.set_domain(domain);
        }
        route
            .where_all(config.wheres.clone())
            .middleware(config.middleware.iter().cloned())
            .fallback(config.fallback);
        for (name, value) in &config.defaults {
            route.default(name.clone(), value.clone());
        }
        if let Some(name) = &config.name {
            route.name(name);
        }
        match config.scheme.as_str() {
            "http" => {
                route.http_only();
            }
            "https" => {
                route.https_only();
            }
            _ => {}
        }

        self.routes.add(route);
    }

    fn register_config_group(&mut self, config: &GroupConfig) {
        let attributes = GroupAttributes {
            prefix: config.prefix.clone(),
            name: config.name.clone(),
            domain: config.domain.clone(),
            middleware: config.middleware.clone(),
            wheres: config.wheres.clone(),
        };
        self.group(attributes, |router| {
            for route in &config.routes {
                router.register_config_route(route);
            }
            for group in &config.groups {
                router.register_config_group(group);
            }
        });
    }

    /// GET (and therefore HEAD).
    pub fn get(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["GET"], uri, Some(action))
    }

    pub fn post(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["POST"], uri, Some(action))
    }

    pub fn put(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["PUT"], uri, Some(action))
    }

    pub fn patch(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["PATCH"], uri, Some(action))
    }

    pub fn delete(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["DELETE"], uri, Some(action))
    }

    pub fn options(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["OPTIONS"], uri, Some(action))
    }

    pub fn head(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(["HEAD"], uri, Some(action))
    }

    /// Every verb.
    pub fn any(&mut self, uri: &str, action: &str) -> &mut Route {
        self.add_route(VERBS.iter().map(|m| m.as_str()), uri, Some(action))
    }

    /// The listed verbs, upper-cased.
    pub fn match_methods(&mut self, methods: &[&str], uri: &str, action: &str) -> &mut Route {
        self.add_route(methods.iter().map(|m| m.to_ascii_uppercase()), uri, Some(action))
    }

    /// Catch-all GET route, tried after every other route.
    pub fn fallback(&mut self, action: &str) -> &mut Route {
        self.fallback_for(&["GET"], action)
    }

    /// Catch-all route for the given verbs.
    pub fn fallback_for<S: AsRef<str>>(&mut self, methods: &[S], action: &str) -> &mut Route {
        let mut route = self.new_route(
            expand_methods(methods),
            &format!("{{{FALLBACK_PLACEHOLDER}}}"),
            Some(action),
        );
        route.where_(FALLBACK_PLACEHOLDER, ".*").fallback(true);
        self.routes.add(route)
    }

    /// Create, group-merge and register a route.
    pub fn add_route<I, S>(&mut self, methods: I, uri: &str, action: Option<&str>) -> &mut Route
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let route = self.new_route(methods, uri, action);
        self.routes.add(route)
    }

    /// Create a route carrying the current group's attributes without
    /// registering it.
    pub fn new_route<I, S>(&self, methods: I, uri: &str, action: Option<&str>) -> Route
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut route = Route::new(methods, self.prefix(uri));
        if let Some(action) = action {
            route.set_action(action);
        }

        if let Some(group) = self.group_stack.last() {
            if let Some(domain) = &group.domain {
                route.set_domain(domain);
            }
            if let Some(name) = &group.name {
                route.name(name);
            }
            route
                .middleware(group.middleware.iter().cloned())
                .where_all(group.wheres.clone());
        }
        route
    }

    /// Register routes inside a group; attributes merge with any enclosing
    /// group and are dropped when `routes` returns.
    pub fn group<F>(&mut self, attributes: GroupAttributes, routes: F)
    where
        F: FnOnce(&mut Router),
    {
        let merged = match self.group_stack.last() {
            Some(last) => GroupAttributes::merge(&attributes, last),
            None => attributes,
        };
        self.group_stack.push(merged);
        routes(self);
        self.group_stack.pop();
    }

    /// `uri` under the current group prefix, trimmed of `/`; `/` when empty.
    pub fn prefix(&self, uri: &str) -> String {
        let group_prefix = self
            .group_stack
            .last()
            .and_then(|group| group.prefix.as_deref())
            .unwrap_or_default();
        let joined = format!("{}/{}", group_prefix.trim_matches('/'), uri.trim_matches('/'));
        let trimmed = joined.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn has_group_stack(&self) -> bool {
        !self.group_stack.is_empty()
    }

    pub fn group_stack(&self) -> &[GroupAttributes] {
        &self.group_stack
    }

    /// Resolve a request against the route table.
    pub fn dispatch(&self, request: &dyn RouteRequest) -> RouteResult<RouteLookup<'_>> {
        let start = Instant::now();
        let result = self.routes.match_request(request);

        let outcome = match &result {
            Ok(lookup) => lookup.outcome(),
            Err(_) => "error",
        };
        metrics::record_dispatch(outcome, start);

        match &result {
            Ok(_) => tracing::debug!(
                method = %request.method(),
                path = %request.path(),
                host = %request.host(),
                outcome,
                "Request dispatched"
            ),
            Err(e) => tracing::error!(
                method = %request.method(),
                path = %request.path(),
                error = %e,
                "Route failed to compile during dispatch"
            ),
        }
        result
    }

    /// Bind the named route to `request` without matching.
    pub fn respond_with_route(
        &self,
        name: &str,
        request: &dyn RouteRequest,
    ) -> RouteResult<Option<BoundRoute<'_>>> {
        self.routes
            .get_by_name(name)
            .map(|route| route.bind(request))
            .transpose()
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RouteCollection {
        &mut self.routes
    }

    /// Compile every route; returns how many were compiled.
    pub fn compile_all(&self) -> RouteResult<usize> {
        self.routes.compile_all()
    }
}

/// Upper-case verb names; `ANY` expands to every verb.
fn expand_methods<S: AsRef<str>>(methods: &[S]) -> Vec<String> {
    let mut expanded = Vec::new();
    for method in methods {
        let method = method.as_ref().trim().to_ascii_uppercase();
        if method == "ANY" {
            expanded.extend(VERBS.iter().map(|m| m.as_str().to_string()));
        } else {
            expanded.push(method);
        }
    }
    expanded
}
