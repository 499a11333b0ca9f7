//! Parameter extraction.
//!
//! Runs the compiled expressions against a request that already matched and
//! turns the named captures into the route's parameter map.

use std::collections::HashMap;

use regex::Regex;

use crate::routing::compiled::CompiledRoute;
use crate::routing::request::{matchable_path, RouteRequest};

/// Extracts bound parameters for a compiled route.
#[derive(Debug, Clone, Copy)]
pub struct ParameterBinder<'a> {
    compiled: &'a CompiledRoute,
}

impl<'a> ParameterBinder<'a> {
    pub fn new(compiled: &'a CompiledRoute) -> Self {
        Self { compiled }
    }

    /// Every declared variable, host first then path, defaulted where the
    /// request left it empty. Defaults for undeclared names are kept too.
    pub fn parameters(&self, request: &dyn RouteRequest) -> HashMap<String, String> {
        let mut parameters = HashMap::new();

        if let Some(host) = self.compiled.host_regex() {
            parameters.extend(capture(
                host,
                request.host(),
                self.compiled.host_variables(),
            ));
        }
        parameters.extend(capture(
            self.compiled.regex(),
            &matchable_path(request),
            self.compiled.path_variables(),
        ));

        self.replace_defaults(parameters)
    }

    fn replace_defaults(&self, mut parameters: HashMap<String, String>) -> HashMap<String, String> {
        let defaults = self.compiled.defaults();
        for (name, value) in parameters.iter_mut() {
            if value.is_empty() {
                if let Some(default) = defaults.get(name) {
                    value.clone_from(default);
                }
            }
        }
        for (name, default) in defaults {
            parameters
                .entry(name.clone())
                .or_insert_with(|| default.clone());
        }
        parameters
    }
}

/// Named captures restricted to `declared`; unmatched groups bind as empty.
fn capture(regex: &Regex, subject: &str, declared: &[String]) -> HashMap<String, String> {
    let Some(caps) = regex.captures(subject) else {
        return HashMap::new();
    };
    declared
        .iter()
        .map(|name| {
            let value = caps.name(name).map_or("", |m| m.as_str());
            (name.clone(), value.to_string())
        })
        .collect()
}
