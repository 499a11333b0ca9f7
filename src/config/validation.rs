//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject unknown verbs, empty templates and bad scheme values
//! - Detect duplicate route names across groups
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Template compilation errors are left to the router, which reports them
//!   with the offending pattern

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{AppConfig, GroupConfig, RouteConfig};
use crate::routing::VERBS;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Where the problem is, e.g. `groups[0].routes[2]`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Check every route, group and the fallback; collect every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut validator = Validator::default();

    for (i, route) in config.routes.iter().enumerate() {
        validator.route(&format!("routes[{i}]"), "", route);
    }
    for (i, group) in config.groups.iter().enumerate() {
        validator.group(&format!("groups[{i}]"), "", group);
    }
    if let Some(fallback) = &config.fallback {
        if fallback.action.trim().is_empty() {
            validator.error("fallback", "action must not be empty");
        }
        validator.methods("fallback", &fallback.methods);
    }
    if config.timeouts.request_secs == 0 {
        validator.error("timeouts.request_secs", "must be greater than zero");
    }

    if validator.errors.is_empty() {
        Ok(())
    } else {
        Err(validator.errors)
    }
}

#[derive(Default)]
struct Validator {
    errors: Vec<ValidationError>,
    names: HashSet<String>,
}

impl Validator {
    fn error(&mut self, location: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            location: location.to_string(),
            message: message.into(),
        });
    }

    fn group(&mut self, location: &str, name_prefix: &str, group: &GroupConfig) {
        let name_prefix = format!("{name_prefix}{}", group.name.as_deref().unwrap_or_default());

        for (key, requirement) in &group.wheres {
            if requirement.is_empty() {
                self.error(location, format!("requirement for \"{key}\" must not be empty"));
            }
        }
        for (i, route) in group.routes.iter().enumerate() {
            self.route(&format!("{location}.routes[{i}]"), &name_prefix, route);
        }
        for (i, nested) in group.groups.iter().enumerate() {
            self.group(&format!("{location}.groups[{i}]"), &name_prefix, nested);
        }
    }

    fn route(&mut self, location: &str, name_prefix: &str, route: &RouteConfig) {
        if route.uri.trim().is_empty() {
            self.error(location, "uri must not be empty");
        }
        self.methods(location, &route.methods);

        if !matches!(route.scheme.as_str(), "any" | "http" | "https") {
            self.error(
                location,
                format!("scheme must be one of any, http, https (got \"{}\")", route.scheme),
            );
        }
        for (key, requirement) in &route.wheres {
            if requirement.is_empty() {
                self.error(location, format!("requirement for \"{key}\" must not be empty"));
            }
        }
        if let Some(name) = &route.name {
            let full = format!("{name_prefix}{name}");
            if !self.names.insert(full.clone()) {
                self.error(location, format!("duplicate route name \"{full}\""));
            }
        }
    }

    fn methods(&mut self, location: &str, methods: &[String]) {
        if methods.is_empty() {
            self.error(location, "at least one method is required");
        }
        for method in methods {
            let upper = method.trim().to_ascii_uppercase();
            if upper != "ANY" && !VERBS.iter().any(|verb| verb.as_str() == upper) {
                self.error(location, format!("unknown method \"{method}\""));
            }
        }
    }
}
