//! Route group attributes and their merge rules.

use std::collections::HashMap;

/// Attributes shared by every route registered inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttributes {
    pub prefix: Option<String>,
    /// Name prefix (`as`).
    pub name: Option<String>,
    pub domain: Option<String>,
    pub middleware: Vec<String>,
    pub wheres: HashMap<String, String>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(middleware.into_iter().map(Into::into));
        self
    }

    pub fn where_(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.wheres.insert(name.into(), expression.into());
        self
    }

    /// Merge `new` (inner group) onto `old` (enclosing group).
    ///
    /// - `domain`: the inner one replaces the outer one
    /// - `prefix`: outer and inner joined with a single `/`
    /// - `name`: outer then inner, concatenated
    /// - `middleware`: outer first, then inner
    /// - `wheres`: inner entries override outer ones
    pub fn merge(new: &GroupAttributes, old: &GroupAttributes) -> GroupAttributes {
        let prefix = match (&old.prefix, &new.prefix) {
            (old_prefix, Some(new_prefix)) => Some(format!(
                "{}/{}",
                old_prefix.as_deref().unwrap_or_default().trim_matches('/'),
                new_prefix.trim_matches('/')
            )),
            (old_prefix, None) => old_prefix.clone(),
        };

        let name = match (&old.name, &new.name) {
            (None, None) => None,
            (outer, inner) => Some(format!(
                "{}{}",
                outer.as_deref().unwrap_or_default(),
                inner.as_deref().unwrap_or_default()
            )),
        };

        let mut middleware = old.middleware.clone();
        middleware.extend(new.middleware.iter().cloned());

        let mut wheres = old.wheres.clone();
        wheres.extend(new.wheres.clone());

        GroupAttributes {
            prefix,
            name,
            domain: new.domain.clone().or_else(|| old.domain.clone()),
            middleware,
            wheres,
        }
    }
}
