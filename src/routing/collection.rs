//! Route storage and request matching.
//!
//! # Responsibilities
//! - Index routes by verb, by verb+domain+uri and by name
//! - Resolve a request to exactly one bound route
//! - Tell "method not allowed" apart from "not found" by probing other verbs
//!
//! # Design Decisions
//! - Registration order is the only tie-break; no specificity ranking
//! - Fallback routes are tried after every other candidate
//! - Re-registering the same verb+domain+uri replaces the old route in place
//! - The name table is rebuilt on demand, since names may change after
//!   registration

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::error::RouteResult;
use crate::routing::lookup::{AllowedMethods, RouteLookup, VERBS};
use crate::routing::matcher::ValidatorChain;
use crate::routing::request::RouteRequest;
use crate::routing::route::Route;

/// Insertion-ordered key to route slot map.
#[derive(Debug, Clone, Default)]
struct OrderedIndex {
    keys: Vec<String>,
    slots: HashMap<String, usize>,
}

impl OrderedIndex {
    /// Point `key` at `slot`; an existing key keeps its position.
    ///
    /// Returns the slot the key pointed at before, if any.
    fn insert(&mut self, key: String, slot: usize) -> Option<usize> {
        let replaced = self.slots.insert(key.clone(), slot);
        if replaced.is_none() {
            self.keys.push(key);
        }
        replaced
    }

    fn contains_slot(&self, slot: usize) -> bool {
        self.slots.values().any(|s| *s == slot)
    }

    fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys.iter().filter_map(|key| self.slots.get(key).copied())
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

/// All registered routes.
#[derive(Debug, Default)]
pub struct RouteCollection {
    routes: Vec<Route>,
    by_method: HashMap<Method, OrderedIndex>,
    all: OrderedIndex,
    by_name: HashMap<String, usize>,
    validators: ValidatorChain,
}

impl RouteCollection {
    /// Empty collection using the standard validator chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty collection using a custom validator chain.
    pub fn with_validators(validators: ValidatorChain) -> Self {
        Self {
            validators,
            ..Self::default()
        }
    }

    /// Register a route and return it for further configuration.
    ///
    /// A route whose every verb+domain+uri key is taken over by `route`
    /// becomes unreachable, and its name entry is dropped with it.
    pub fn add(&mut self, route: Route) -> &mut Route {
        let slot = self.routes.len();
        let domain_and_uri = route.domain_and_uri();
        let mut replaced = Vec::new();

        for method in route.methods() {
            self.by_method
                .entry(method.clone())
                .or_default()
                .insert(domain_and_uri.clone(), slot);
            replaced.extend(
                self.all
                    .insert(format!("{}{}", method.as_str(), domain_and_uri), slot),
            );
        }
        if !replaced.is_empty() {
            let all = &self.all;
            self.by_name.retain(|_, named| all.contains_slot(*named));
        }
        if let Some(name) = route.route_name() {
            self.by_name.insert(name.to_string(), slot);
        }

        tracing::debug!(
            methods = ?route.methods(),
            uri = %route.uri(),
            domain = route.domain(),
            name = route.route_name(),
            "Route registered"
        );

        self.routes.push(route);
        &mut self.routes[slot]
    }

    /// Rebuild the name table from every registered route.
    pub fn refresh_name_lookups(&mut self) {
        let mut by_name = HashMap::new();
        for slot in self.all.slots() {
            if let Some(name) = self.routes[slot].route_name() {
                by_name.insert(name.to_string(), slot);
            }
        }
        self.by_name = by_name;
    }

    /// Resolve `request` to a bound route or a typed miss.
    ///
    /// `Err` only when a route fails to compile, which is a configuration bug.
    pub fn match_request(&self, request: &dyn RouteRequest) -> RouteResult<RouteLookup<'_>> {
        let candidates = self.get_by_method(request.method());

        if let Some(route) = self.match_against_routes(&candidates, request, true)? {
            return Ok(RouteLookup::Matched(route.bind(request)?));
        }

        let others = self.check_for_alternate_verbs(request)?;
        if others.is_empty() {
            return Ok(RouteLookup::NotFound);
        }

        let allowed = AllowedMethods::new(others);
        if *request.method() == Method::OPTIONS {
            Ok(RouteLookup::Options { allowed })
        } else {
            Ok(RouteLookup::MethodNotAllowed { allowed })
        }
    }

    /// First matching route, non-fallback routes before fallback ones.
    fn match_against_routes<'r>(
        &self,
        routes: &[&'r Route],
        request: &dyn RouteRequest,
        including_method: bool,
    ) -> RouteResult<Option<&'r Route>> {
        let ordered = routes
            .iter()
            .filter(|r| !r.is_fallback())
            .chain(routes.iter().filter(|r| r.is_fallback()));

        for route in ordered {
            if route.matches(request, including_method, &self.validators)? {
                return Ok(Some(*route));
            }
        }
        Ok(None)
    }

    /// Other verbs under which some route matches, method ignored.
    fn check_for_alternate_verbs(&self, request: &dyn RouteRequest) -> RouteResult<Vec<Method>> {
        let mut others = Vec::new();
        for verb in VERBS.iter().filter(|v| *v != request.method()) {
            let routes = self.get_by_method(verb);
            if self.match_against_routes(&routes, request, false)?.is_some() {
                others.push(verb.clone());
            }
        }
        Ok(others)
    }

    /// Routes registered for `method`, in registration order.
    pub fn get_by_method(&self, method: &Method) -> Vec<&Route> {
        self.by_method
            .get(method)
            .map(|index| index.slots().map(|slot| &self.routes[slot]).collect())
            .unwrap_or_default()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|slot| &self.routes[*slot])
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut Route> {
        let slot = *self.by_name.get(name)?;
        self.routes.get_mut(slot)
    }

    pub fn has_named_route(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Every live route once, in registration order.
    pub fn routes(&self) -> Vec<&Route> {
        let mut seen = Vec::new();
        for slot in self.all.slots() {
            if !seen.contains(&slot) {
                seen.push(slot);
            }
        }
        seen.into_iter().map(|slot| &self.routes[slot]).collect()
    }

    pub fn routes_by_method(&self) -> HashMap<&Method, Vec<&Route>> {
        self.by_method
            .keys()
            .map(|method| (method, self.get_by_method(method)))
            .collect()
    }

    pub fn routes_by_name(&self) -> HashMap<&str, &Route> {
        self.by_name
            .iter()
            .map(|(name, slot)| (name.as_str(), &self.routes[*slot]))
            .collect()
    }

    /// Number of verb+domain+uri entries.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.len() == 0
    }

    /// Compile every route now instead of on first request.
    pub fn compile_all(&self) -> RouteResult<usize> {
        let routes = self.routes();
        for route in &routes {
            route.compile()?;
        }
        Ok(routes.len())
    }

    pub fn validators(&self) -> &ValidatorChain {
        &self.validators
    }
}
