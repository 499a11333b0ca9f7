//! Route configuration errors.
//!
//! Everything here is raised while a template is compiled, never while a
//! request is matched. These are programmer errors: surface them at start-up
//! and never retry.

use thiserror::Error;

/// Errors raised while compiling a route template.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The same placeholder appears twice across host and path.
    #[error("Route pattern \"{pattern}\" cannot reference variable name \"{name}\" more than once.")]
    DuplicateVariable { pattern: String, name: String },

    /// Placeholder names must not start with a digit.
    #[error("Variable name \"{name}\" cannot start with a digit in route pattern \"{pattern}\". Please use a different name.")]
    VariableStartsWithDigit { pattern: String, name: String },

    /// Placeholder names are capped so they stay valid capture group names.
    #[error("Variable name \"{name}\" cannot be longer than {max} characters in route pattern \"{pattern}\". Please use a shorter name.")]
    VariableTooLong {
        pattern: String,
        name: String,
        max: usize,
    },

    /// `_fragment` is reserved in path templates.
    #[error("Route pattern \"{pattern}\" cannot contain \"_fragment\" as a path parameter.")]
    ReservedVariable { pattern: String },

    /// A requirement that is empty once its anchors are stripped.
    #[error("Routing requirement for \"{name}\" cannot be empty.")]
    EmptyRequirement { name: String },

    /// Non-ASCII template while the route's `utf8` option is off.
    #[error("Cannot use UTF-8 route patterns without setting the \"utf8\" option for route \"{pattern}\".")]
    Utf8Pattern { pattern: String },

    /// Unicode-only requirement while the route's `utf8` option is off.
    #[error("Cannot use UTF-8 route requirements without setting the \"utf8\" option for variable \"{name}\" in pattern \"{pattern}\".")]
    Utf8Requirement { pattern: String, name: String },

    /// The assembled expression was rejected by the regex engine.
    #[error("Route pattern \"{pattern}\" produced an invalid expression: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for route compilation.
pub type RouteResult<T> = Result<T, RouteError>;
