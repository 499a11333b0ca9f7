//! A route bound to one request.

use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::compiled::CompiledRoute;
use crate::routing::route::Route;

/// The matched route together with the parameters extracted from the request.
///
/// Only [`Route::bind`] produces this value, so parameters are never read
/// from an unbound route.
#[derive(Debug, Clone)]
pub struct BoundRoute<'a> {
    route: &'a Route,
    compiled: Arc<CompiledRoute>,
    parameters: HashMap<String, String>,
    original: HashMap<String, String>,
}

impl<'a> BoundRoute<'a> {
    pub(crate) fn new(
        route: &'a Route,
        compiled: Arc<CompiledRoute>,
        parameters: HashMap<String, String>,
    ) -> Self {
        Self {
            route,
            compiled,
            original: parameters.clone(),
            parameters,
        }
    }

    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// The artifact the parameters were extracted with.
    pub fn compiled(&self) -> &CompiledRoute {
        &self.compiled
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn forget_parameter(&mut self, name: &str) {
        self.parameters.remove(name);
    }

    /// Parameters as bound, unaffected by later edits.
    pub fn original_parameters(&self) -> &HashMap<String, String> {
        &self.original
    }

    pub fn original_parameter(&self, name: &str) -> Option<&str> {
        self.original.get(name).map(String::as_str)
    }
}
