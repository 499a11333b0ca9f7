//! Route definitions.
//!
//! # Responsibilities
//! - Hold one route's template, verbs, constraints, defaults and metadata
//! - Own the lazily compiled matching automaton
//! - Bind a matching request to produce a [`BoundRoute`]
//!
//! # Design Decisions
//! - The compiled artifact sits in a `OnceLock`, so racing first requests
//!   publish exactly one value
//! - Setters that change matching behavior replace the cell, which clears it
//! - GET routes always answer HEAD as well

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use axum::http::Method;
use regex::Regex;

use crate::routing::binder::ParameterBinder;
use crate::routing::bound::BoundRoute;
use crate::routing::compiled::CompiledRoute;
use crate::routing::compiler::RouteCompiler;
use crate::routing::error::RouteResult;
use crate::routing::matcher::ValidatorChain;
use crate::routing::request::RouteRequest;

/// A single route definition.
#[derive(Debug, Clone)]
pub struct Route {
    uri: String,
    methods: Vec<Method>,
    domain: Option<String>,
    http_only: bool,
    https_only: bool,
    wheres: HashMap<String, String>,
    defaults: HashMap<String, String>,
    name: Option<String>,
    middleware: Vec<String>,
    fallback: bool,
    action: Option<String>,
    utf8: bool,
    compiled: OnceLock<Arc<CompiledRoute>>,
}

impl Route {
    /// Create a route answering `methods` on `uri`.
    ///
    /// Verb names are upper-cased. Names that are not valid HTTP tokens are
    /// dropped with a warning; configuration validation rejects them earlier.
    pub fn new<I, S>(methods: I, uri: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<Method> = Vec::new();
        for verb in methods {
            let verb = verb.as_ref().trim().to_ascii_uppercase();
            match Method::from_bytes(verb.as_bytes()) {
                Ok(method) if !parsed.contains(&method) => parsed.push(method),
                Ok(_) => {}
                Err(_) => tracing::warn!(method = %verb, "Ignoring invalid HTTP method"),
            }
        }
        if parsed.contains(&Method::GET) && !parsed.contains(&Method::HEAD) {
            parsed.push(Method::HEAD);
        }

        Self {
            uri: uri.into(),
            methods: parsed,
            domain: None,
            http_only: false,
            https_only: false,
            wheres: HashMap::new(),
            defaults: HashMap::new(),
            name: None,
            middleware: Vec::new(),
            fallback: false,
            action: None,
            utf8: true,
            compiled: OnceLock::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.uri = uri.into();
        self.invalidate()
    }

    /// Prepend `prefix` to the uri.
    pub fn prefix(&mut self, prefix: &str) -> &mut Self {
        let uri = format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            self.uri.trim_start_matches('/')
        );
        let trimmed = uri.trim_matches('/');
        let uri = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        self.set_uri(uri)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Set the host template. A leading `http://` or `https://` is dropped.
    pub fn set_domain(&mut self, domain: &str) -> &mut Self {
        let stripped = domain
            .strip_prefix("http://")
            .or_else(|| domain.strip_prefix("https://"))
            .unwrap_or(domain);
        self.domain = (!stripped.is_empty()).then(|| stripped.to_string());
        self.invalidate()
    }

    /// Constrain one variable with a regex fragment.
    pub fn where_(&mut self, name: impl Into<String>, expression: impl Into<String>) -> &mut Self {
        self.wheres.insert(name.into(), expression.into());
        self.invalidate()
    }

    pub fn where_all<I, K, V>(&mut self, wheres: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.wheres
            .extend(wheres.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.invalidate()
    }

    pub fn wheres(&self) -> &HashMap<String, String> {
        &self.wheres
    }

    /// Default value for a variable the path may omit.
    pub fn default(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.defaults.insert(name.into(), value.into());
        self.invalidate()
    }

    pub fn defaults(&self) -> &HashMap<String, String> {
        &self.defaults
    }

    /// Append to the route name, so group prefixes compose.
    pub fn name(&mut self, name: &str) -> &mut Self {
        match &mut self.name {
            Some(existing) => existing.push_str(name),
            None => self.name = Some(name.to_string()),
        }
        self
    }

    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the name matches any of `patterns`; `*` matches any run of
    /// characters.
    pub fn named(&self, patterns: &[&str]) -> bool {
        let Some(name) = self.name.as_deref() else {
            return false;
        };
        patterns.iter().any(|pattern| {
            if *pattern == name {
                return true;
            }
            let expression = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
            Regex::new(&expression).is_ok_and(|re| re.is_match(name))
        })
    }

    pub fn middleware<I, S>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(middleware.into_iter().map(Into::into));
        self
    }

    pub fn middlewares(&self) -> &[String] {
        &self.middleware
    }

    /// Mark the route as a fallback, tried after every other route.
    pub fn fallback(&mut self, fallback: bool) -> &mut Self {
        self.fallback = fallback;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Only match plain HTTP requests.
    pub fn http_only(&mut self) -> &mut Self {
        self.http_only = true;
        self.https_only = false;
        self
    }

    /// Only match TLS requests.
    pub fn https_only(&mut self) -> &mut Self {
        self.https_only = true;
        self.http_only = false;
        self
    }

    pub fn secure(&mut self) -> &mut Self {
        self.https_only()
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn is_https_only(&self) -> bool {
        self.https_only
    }

    /// Handler the route dispatches to.
    pub fn set_action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = Some(action.into());
        self
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Allow non-ASCII templates and unicode requirements (on by default).
    pub fn utf8(&mut self, utf8: bool) -> &mut Self {
        self.utf8 = utf8;
        self.invalidate()
    }

    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    /// Key used by the collection indices.
    pub fn domain_and_uri(&self) -> String {
        format!("{}{}", self.domain.as_deref().unwrap_or_default(), self.uri)
    }

    /// Compile the route, or return the cached artifact.
    ///
    /// Two threads racing here may both compile; only one result is kept and
    /// both observe it.
    pub fn compile(&self) -> RouteResult<Arc<CompiledRoute>> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(Arc::clone(compiled));
        }
        let compiled = Arc::new(RouteCompiler::new(self).compile()?);
        Ok(Arc::clone(self.compiled.get_or_init(|| compiled)))
    }

    /// The cached artifact, if compiled since the last change.
    pub fn compiled(&self) -> Option<&Arc<CompiledRoute>> {
        self.compiled.get()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Host variables then path variables.
    pub fn parameter_names(&self) -> RouteResult<Vec<String>> {
        Ok(self.compile()?.variables().to_vec())
    }

    /// Run the validator chain against `request`.
    ///
    /// With `including_method` off the verb is ignored, which is how
    /// alternate verbs are tried.
    pub fn matches(
        &self,
        request: &dyn RouteRequest,
        including_method: bool,
        validators: &ValidatorChain,
    ) -> RouteResult<bool> {
        let compiled = self.compile()?;
        Ok(validators.matches(self, &compiled, request, including_method))
    }

    /// Extract the parameters of a request that matched this route.
    pub fn bind(&self, request: &dyn RouteRequest) -> RouteResult<BoundRoute<'_>> {
        let compiled = self.compile()?;
        let parameters = ParameterBinder::new(&compiled).parameters(request);
        Ok(BoundRoute::new(self, compiled, parameters))
    }

    fn invalidate(&mut self) -> &mut Self {
        self.compiled = OnceLock::new();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::request::MatchRequest;

    #[test]
    fn test_get_implies_head() {
        let route = Route::new(["get"], "/");
        assert_eq!(route.methods(), &[Method::GET, Method::HEAD]);

        let route = Route::new(["HEAD", "GET"], "/");
        assert_eq!(route.methods(), &[Method::HEAD, Method::GET]);

        let route = Route::new(["POST"], "/");
        assert_eq!(route.methods(), &[Method::POST]);
    }

    #[test]
    fn test_compile_is_cached_until_changed() {
        let mut route = Route::new(["GET"], "users/{id}");
        let first = route.compile().unwrap();
        let second = route.compile().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        route.where_("id", r"\d+");
        assert!(!route.is_compiled());
        let third = route.compile().unwrap();
        assert_ne!(first.regex().as_str(), third.regex().as_str());
        assert_eq!(third.regex().as_str(), r"(?s)^/users/(?P<id>\d+)$");
    }

    #[test]
    fn test_name_appends() {
        let mut route = Route::new(["GET"], "/");
        route.name("admin.").name("users.index");
        assert_eq!(route.route_name(), Some("admin.users.index"));
        assert!(route.named(&["admin.*"]));
        assert!(route.named(&["other", "admin.users.index"]));
        assert!(!route.named(&["users.*"]));
    }

    #[test]
    fn test_domain_strips_scheme() {
        let mut route = Route::new(["GET"], "/");
        route.set_domain("https://api.example.com");
        assert_eq!(route.domain(), Some("api.example.com"));
        assert_eq!(route.domain_and_uri(), "api.example.com/");
    }

    #[test]
    fn test_prefix() {
        let mut route = Route::new(["GET"], "/users");
        route.prefix("/api/");
        assert_eq!(route.uri(), "api/users");

        let mut route = Route::new(["GET"], "/");
        route.prefix("");
        assert_eq!(route.uri(), "/");
    }

    #[test]
    fn test_bind_extracts_parameters() {
        let route = Route::new(["GET"], "users/{id}");
        let request = MatchRequest::new(Method::GET, "/users/42");
        let bound = route.bind(&request).unwrap();
        assert_eq!(bound.parameter("id"), Some("42"));
    }

    #[test]
    fn test_parameter_names_host_first() {
        let mut route = Route::new(["GET"], "posts/{post}");
        route.set_domain("{tenant}.example.com");
        assert_eq!(route.parameter_names().unwrap(), vec!["tenant", "post"]);
    }

    #[test]
    fn test_scheme_flags_are_exclusive() {
        let mut route = Route::new(["GET"], "/");
        route.http_only().secure();
        assert!(route.is_https_only());
        assert!(!route.is_http_only());
    }
}
