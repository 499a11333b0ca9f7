//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request path against the compiled path expression
//! - Match the request verb against the route's verbs
//! - Match the scheme against http-only / https-only flags
//! - Match the host against the compiled host expression
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - The chain is an explicit, immutable list owned by the collection
//! - Order is URI, method, scheme, host; the first failure short-circuits
//! - Host matching is case-insensitive (the host expression says so)
//! - Path matching is case-sensitive

use crate::routing::compiled::CompiledRoute;
use crate::routing::request::{matchable_path, RouteRequest};
use crate::routing::route::Route;

/// A single predicate a request must satisfy to match a route.
pub trait Validator: Send + Sync + std::fmt::Debug {
    /// Returns true if the request satisfies this condition.
    fn matches(&self, route: &Route, compiled: &CompiledRoute, request: &dyn RouteRequest) -> bool;

    /// Method validators are skipped while probing alternate verbs.
    fn checks_method(&self) -> bool {
        false
    }
}

/// Matches the request path.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriValidator;

impl Validator for UriValidator {
    fn matches(&self, _route: &Route, compiled: &CompiledRoute, request: &dyn RouteRequest) -> bool {
        compiled.regex().is_match(&matchable_path(request))
    }
}

/// Matches the request verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodValidator;

impl Validator for MethodValidator {
    fn matches(&self, route: &Route, _compiled: &CompiledRoute, request: &dyn RouteRequest) -> bool {
        route.methods().contains(request.method())
    }

    fn checks_method(&self) -> bool {
        true
    }
}

/// Matches the request scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeValidator;

impl Validator for SchemeValidator {
    fn matches(&self, route: &Route, _compiled: &CompiledRoute, request: &dyn RouteRequest) -> bool {
        if route.is_http_only() {
            !request.is_secure()
        } else if route.is_https_only() {
            request.is_secure()
        } else {
            true
        }
    }
}

/// Matches the request host. Routes without a domain accept any host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostValidator;

impl Validator for HostValidator {
    fn matches(&self, _route: &Route, compiled: &CompiledRoute, request: &dyn RouteRequest) -> bool {
        compiled
            .host_regex()
            .map_or(true, |host| host.is_match(request.host()))
    }
}

/// Combines validators with AND semantics.
#[derive(Debug)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self { validators }
    }

    /// URI, method, scheme, host.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(UriValidator),
            Box::new(MethodValidator),
            Box::new(SchemeValidator),
            Box::new(HostValidator),
        ])
    }

    pub fn matches(
        &self,
        route: &Route,
        compiled: &CompiledRoute,
        request: &dyn RouteRequest,
        including_method: bool,
    ) -> bool {
        self.validators
            .iter()
            .filter(|v| including_method || !v.checks_method())
            .all(|v| v.matches(route, compiled, request))
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for ValidatorChain {
    fn default() -> Self {
        Self::standard()
    }
}
