//! Compiled route artifact.
//!
//! Produced by the compiler, cached on a [`Route`](crate::routing::Route) and
//! never mutated afterwards. A recompile builds a fresh value and replaces the
//! cached `Arc` wholesale.

use std::collections::HashMap;

use regex::Regex;

/// One lexical piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, matched verbatim.
    Text(String),
    /// A placeholder.
    Variable {
        /// Separator character owned by the variable (empty when none).
        prefix: String,
        /// Regex fragment the value must match.
        pattern: String,
        /// Placeholder name.
        name: String,
        /// Whether the route required UTF-8 aware matching.
        utf8: bool,
    },
}

impl Token {
    /// Name of the variable, `None` for text tokens.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Token::Variable { name, .. } => Some(name),
            Token::Text(_) => None,
        }
    }
}

/// Output of compiling one template (path or host).
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub static_prefix: String,
    pub regex: Regex,
    pub tokens: Vec<Token>,
    pub variables: Vec<String>,
}

/// Immutable matching automaton for a route.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    static_prefix: String,
    regex: Regex,
    tokens: Vec<Token>,
    path_variables: Vec<String>,
    host_regex: Option<Regex>,
    host_tokens: Vec<Token>,
    host_variables: Vec<String>,
    variables: Vec<String>,
    defaults: HashMap<String, String>,
}

impl CompiledRoute {
    pub(crate) fn new(
        path: CompiledPattern,
        host: Option<CompiledPattern>,
        defaults: HashMap<String, String>,
    ) -> Self {
        let (host_regex, host_tokens, host_variables) = match host {
            Some(h) => (Some(h.regex), h.tokens, h.variables),
            None => (None, Vec::new(), Vec::new()),
        };

        let mut variables = host_variables.clone();
        variables.extend(path.variables.iter().cloned());

        Self {
            static_prefix: path.static_prefix,
            regex: path.regex,
            tokens: path.tokens,
            path_variables: path.variables,
            host_regex,
            host_tokens,
            host_variables,
            variables,
            defaults,
        }
    }

    /// Longest literal prefix every matching path starts with.
    pub fn static_prefix(&self) -> &str {
        &self.static_prefix
    }

    /// Anchored, case-sensitive path expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Anchored, case-insensitive host expression, if the route has a domain.
    pub fn host_regex(&self) -> Option<&Regex> {
        self.host_regex.as_ref()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn host_tokens(&self) -> &[Token] {
        &self.host_tokens
    }

    /// Path variable names in template order.
    pub fn path_variables(&self) -> &[String] {
        &self.path_variables
    }

    /// Host variable names in template order.
    pub fn host_variables(&self) -> &[String] {
        &self.host_variables
    }

    /// Host variables followed by path variables.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Inline defaults overlaid with the route's explicit ones.
    pub fn defaults(&self) -> &HashMap<String, String> {
        &self.defaults
    }
}
