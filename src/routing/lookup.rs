//! Lookup outcomes.
//!
//! Not found and method not allowed are ordinary values, so the transport
//! maps them to status codes without any unwinding.

use axum::http::Method;

use crate::routing::bound::BoundRoute;

/// The verbs tried when the request's own verb matches nothing.
pub const VERBS: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Result of resolving a request against a route collection.
#[derive(Debug)]
pub enum RouteLookup<'a> {
    /// A route matched and was bound to the request.
    Matched(BoundRoute<'a>),
    /// An OPTIONS request for a path other verbs answer.
    Options { allowed: AllowedMethods },
    /// The path matched, but only for other verbs.
    MethodNotAllowed { allowed: AllowedMethods },
    /// Nothing matched under any verb.
    NotFound,
}

impl<'a> RouteLookup<'a> {
    /// Short label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RouteLookup::Matched(_) => "matched",
            RouteLookup::Options { .. } => "options",
            RouteLookup::MethodNotAllowed { .. } => "method_not_allowed",
            RouteLookup::NotFound => "not_found",
        }
    }

    pub fn matched(self) -> Option<BoundRoute<'a>> {
        match self {
            RouteLookup::Matched(bound) => Some(bound),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteLookup::NotFound)
    }
}

/// Allowed verbs for a path, normalized for the `Allow` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods {
    methods: Vec<Method>,
}

impl AllowedMethods {
    /// Create a normalized allow list.
    ///
    /// - Adds `HEAD` if `GET` is present.
    /// - Sorts and de-duplicates for stable output.
    pub fn new(mut methods: Vec<Method>) -> Self {
        if methods.contains(&Method::GET) && !methods.contains(&Method::HEAD) {
            methods.push(Method::HEAD);
        }
        methods.sort_by_key(method_order);
        methods.dedup();
        Self { methods }
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Format as an HTTP Allow header value.
    pub fn header_value(&self) -> String {
        self.methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn method_order(method: &Method) -> usize {
    VERBS
        .iter()
        .position(|verb| verb == method)
        .unwrap_or(VERBS.len())
}
