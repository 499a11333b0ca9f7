//! Template compilation.
//!
//! # Responsibilities
//! - Extract inline options (`{id<\d+>}`, `{page?1}`, `{id?}`) from templates
//! - Lex placeholders and classify the separator in front of each one
//! - Validate placeholder names
//! - Assemble one anchored expression per template (host and path)
//!
//! # Design Decisions
//! - Host expressions are case-insensitive, path expressions are not
//! - Only trailing variables can be optional; optionality comes from `?`
//! - Every failure here is a configuration error, never a request-time one

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::routing::compiled::{CompiledPattern, CompiledRoute, Token};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::route::Route;

/// Characters that a variable may claim as its leading separator.
pub const SEPARATORS: &str = "/,;.:-_~+*=@|";

/// Longest supported placeholder name.
pub const VARIABLE_MAXIMUM_LENGTH: usize = 32;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder expression is valid"));

static INLINE_OPTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\w+)(<.*?>)?(\?[^}]*)?\}").expect("inline option expression is valid")
});

static UNICODE_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\\])(?:\\\\)*\\(?:X|[pP][{CLMNPSZ]|x\{[A-Fa-f0-9]{3})")
        .expect("unicode escape expression is valid")
});

/// Template with its inline options stripped out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InlineOptions {
    pub template: String,
    pub requirements: HashMap<String, String>,
    /// Optional variables and their inline default (empty for `{name?}`).
    pub optionals: HashMap<String, String>,
}

/// Strip `<requirement>` and `?default` suffixes from every placeholder.
pub fn extract_inline_options(template: &str) -> InlineOptions {
    let mut options = InlineOptions::default();
    if !template.contains(['?', '<']) {
        options.template = template.to_string();
        return options;
    }

    options.template = INLINE_OPTIONS
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            if let Some(requirement) = caps.get(2) {
                let raw = requirement.as_str();
                options
                    .requirements
                    .insert(name.to_string(), raw[1..raw.len() - 1].to_string());
            }
            if let Some(default) = caps.get(3) {
                options
                    .optionals
                    .insert(name.to_string(), default.as_str()[1..].to_string());
            }
            format!("{{{name}}}")
        })
        .into_owned();

    options
}

/// Compiles a [`Route`] into its [`CompiledRoute`].
pub struct RouteCompiler<'a> {
    route: &'a Route,
}

impl<'a> RouteCompiler<'a> {
    pub fn new(route: &'a Route) -> Self {
        Self { route }
    }

    pub fn compile(&self) -> RouteResult<CompiledRoute> {
        let path = extract_inline_options(self.route.uri());
        let host = self
            .route
            .domain()
            .filter(|d| !d.is_empty())
            .map(extract_inline_options);

        // Inline options first, explicit ones win.
        let mut requirements = HashMap::new();
        let mut defaults = HashMap::new();
        for inline in host.iter().chain(std::iter::once(&path)) {
            requirements.extend(inline.requirements.clone());
            defaults.extend(inline.optionals.clone());
        }
        requirements.extend(self.route.wheres().clone());
        defaults.extend(self.route.defaults().clone());

        let compiler = PatternCompiler {
            requirements: &requirements,
            defaults: &defaults,
            utf8: self.route.is_utf8(),
        };

        let host_pattern = match &host {
            Some(h) => Some(compiler.compile_pattern(&h.template, true)?),
            None => None,
        };

        let path_template = normalize_path(&path.template);
        let path_pattern = compiler.compile_pattern(&path_template, false)?;

        if let Some(h) = &host_pattern {
            if let Some(name) = path_pattern
                .variables
                .iter()
                .find(|v| h.variables.contains(v))
            {
                return Err(RouteError::DuplicateVariable {
                    pattern: format!("{}{}", self.route.domain().unwrap_or_default(), path_template),
                    name: name.clone(),
                });
            }
        }

        tracing::trace!(
            uri = %self.route.uri(),
            regex = %path_pattern.regex.as_str(),
            host_regex = host_pattern.as_ref().map(|h| h.regex.as_str()),
            "Route compiled"
        );

        Ok(CompiledRoute::new(path_pattern, host_pattern, defaults))
    }
}

/// A path must start with exactly one slash.
fn normalize_path(template: &str) -> String {
    format!("/{}", template.trim().trim_start_matches('/'))
}

/// Compiles a single template under a fixed set of options.
pub struct PatternCompiler<'a> {
    /// Per-variable regex fragments overriding the default.
    pub requirements: &'a HashMap<String, String>,
    /// Variables with a default, inline or explicit. Trailing ones may be omitted.
    pub defaults: &'a HashMap<String, String>,
    /// Whether the route opted into UTF-8 matching.
    pub utf8: bool,
}

impl PatternCompiler<'_> {
    pub fn compile_pattern(&self, pattern: &str, is_host: bool) -> RouteResult<CompiledPattern> {
        let default_separator = if is_host { '.' } else { '/' };

        if !self.utf8 && !pattern.is_ascii() {
            return Err(RouteError::Utf8Pattern {
                pattern: pattern.to_string(),
            });
        }

        let mut tokens = Vec::new();
        let mut variables: Vec<String> = Vec::new();
        let mut pos = 0;

        for caps in PLACEHOLDER.captures_iter(pattern) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let name = &caps[1];

            let preceding_text = &pattern[pos..whole.start];
            pos = whole.end;

            let preceding_char = preceding_text.chars().last();
            let separator = preceding_char.filter(|c| SEPARATORS.contains(*c));

            self.validate_name(pattern, name, &variables, is_host)?;

            match separator {
                Some(sep) if preceding_text.len() > sep.len_utf8() => {
                    let end = preceding_text.len() - sep.len_utf8();
                    tokens.push(Token::Text(preceding_text[..end].to_string()));
                }
                None if !preceding_text.is_empty() => {
                    tokens.push(Token::Text(preceding_text.to_string()));
                }
                _ => {}
            }

            let regexp = match self.requirements.get(name) {
                Some(requirement) => self.prepare_requirement(pattern, name, requirement)?,
                None => {
                    let next = find_next_separator(&pattern[pos..]);
                    let mut class = regex::escape(&default_separator.to_string());
                    if let Some(next) = next.filter(|c| *c != default_separator) {
                        class.push_str(&regex::escape(&next.to_string()));
                    }
                    format!("[^{class}]+")
                }
            };

            tokens.push(Token::Variable {
                prefix: separator.map(String::from).unwrap_or_default(),
                pattern: regexp,
                name: name.to_string(),
                utf8: self.utf8,
            });
            variables.push(name.to_string());
        }

        if pos < pattern.len() {
            tokens.push(Token::Text(pattern[pos..].to_string()));
        }

        let first_optional = if is_host {
            usize::MAX
        } else {
            self.first_optional(&tokens)
        };

        let mut body = String::new();
        for index in 0..tokens.len() {
            body.push_str(&compute_regexp(&tokens, index, first_optional));
        }
        let source = format!("(?s)^{body}$");

        let regex = RegexBuilder::new(&source)
            .case_insensitive(is_host)
            .build()
            .map_err(|source| RouteError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(CompiledPattern {
            static_prefix: self.static_prefix(&tokens),
            regex,
            tokens,
            variables,
        })
    }

    fn validate_name(
        &self,
        pattern: &str,
        name: &str,
        seen: &[String],
        is_host: bool,
    ) -> RouteResult<()> {
        if name.chars().next().is_some_and(char::is_numeric) {
            return Err(RouteError::VariableStartsWithDigit {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        if seen.iter().any(|v| v == name) {
            return Err(RouteError::DuplicateVariable {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        if name.len() > VARIABLE_MAXIMUM_LENGTH {
            return Err(RouteError::VariableTooLong {
                pattern: pattern.to_string(),
                name: name.to_string(),
                max: VARIABLE_MAXIMUM_LENGTH,
            });
        }
        if !is_host && name == "_fragment" {
            return Err(RouteError::ReservedVariable {
                pattern: pattern.to_string(),
            });
        }
        Ok(())
    }

    fn prepare_requirement(&self, pattern: &str, name: &str, requirement: &str) -> RouteResult<String> {
        let sanitized = sanitize_requirement(name, requirement)?;
        if !self.utf8 && (!sanitized.is_ascii() || UNICODE_ESCAPE.is_match(sanitized)) {
            return Err(RouteError::Utf8Requirement {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        Ok(transform_capturing_groups_to_non_capturings(sanitized))
    }

    /// Index of the first token in the trailing run of optional variables.
    fn first_optional(&self, tokens: &[Token]) -> usize {
        let mut first = usize::MAX;
        for (index, token) in tokens.iter().enumerate().rev() {
            match token.variable_name() {
                Some(name) if self.defaults.contains_key(name) => first = index,
                _ => break,
            }
        }
        first
    }

    fn static_prefix(&self, tokens: &[Token]) -> String {
        match tokens.first() {
            None => String::new(),
            Some(Token::Variable { prefix, name, .. }) => {
                if self.defaults.contains_key(name) || prefix == "/" {
                    String::new()
                } else {
                    prefix.clone()
                }
            }
            Some(Token::Text(text)) => {
                let mut prefix = text.clone();
                if let Some(Token::Variable { prefix: sep, name, .. }) = tokens.get(1) {
                    // A separator in front of an optional variable may be absent.
                    if sep != "/" && !self.defaults.contains_key(name) {
                        prefix.push_str(sep);
                    }
                }
                prefix
            }
        }
    }
}

/// Strip one leading `^` and one trailing `$`; reject what is left if empty.
pub fn sanitize_requirement<'r>(name: &str, requirement: &'r str) -> RouteResult<&'r str> {
    let trimmed = requirement.strip_prefix('^').unwrap_or(requirement);
    let trimmed = trimmed.strip_suffix('$').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(RouteError::EmptyRequirement {
            name: name.to_string(),
        });
    }
    Ok(trimmed)
}

/// Next literal separator after a variable, ignoring adjacent placeholders.
fn find_next_separator(following: &str) -> Option<char> {
    let stripped = PLACEHOLDER.replace_all(following, "");
    stripped.chars().next().filter(|c| SEPARATORS.contains(*c))
}

fn compute_regexp(tokens: &[Token], index: usize, first_optional: usize) -> String {
    match &tokens[index] {
        Token::Text(text) => regex::escape(text),
        Token::Variable {
            prefix,
            pattern,
            name,
            ..
        } => {
            if index == 0 && first_optional == 0 {
                // A lone optional variable keeps its separator mandatory.
                return format!("{}(?P<{name}>{pattern})?", regex::escape(prefix));
            }

            let mut regexp = format!("{}(?P<{name}>{pattern})", regex::escape(prefix));
            if index >= first_optional {
                regexp.insert_str(0, "(?:");
                if index == tokens.len() - 1 {
                    let open = tokens.len() - first_optional - usize::from(first_optional == 0);
                    regexp.push_str(&")?".repeat(open));
                }
            }
            regexp
        }
    }
}

/// Rewrite `(` groups as `(?:` so requirements never add captures.
pub fn transform_capturing_groups_to_non_capturings(requirement: &str) -> String {
    let chars: Vec<char> = requirement.chars().collect();
    let mut out = String::with_capacity(requirement.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            out.push(c);
            if let Some(next) = chars.get(i + 1) {
                out.push(*next);
            }
            i += 2;
            continue;
        }
        if c != '(' || i + 2 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }

        out.push('(');
        let next = chars[i + 1];
        if next == '*' || next == '?' {
            out.push(next);
            i += 2;
        } else {
            out.push_str("?:");
            i += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(route: &Route) -> CompiledRoute {
        RouteCompiler::new(route).compile().unwrap()
    }

    #[test]
    fn test_static_template_is_anchored() {
        let route = Route::new(["GET"], "about/team");
        let compiled = compile(&route);

        assert_eq!(compiled.regex().as_str(), "(?s)^/about/team$");
        assert!(compiled.regex().is_match("/about/team"));
        assert!(!compiled.regex().is_match("/about/team/x"));
        assert!(!compiled.regex().is_match("/about"));
        assert_eq!(compiled.static_prefix(), "/about/team");
    }

    #[test]
    fn test_required_variable() {
        let route = Route::new(["GET"], "users/{id}");
        let compiled = compile(&route);

        assert_eq!(compiled.regex().as_str(), "(?s)^/users/(?P<id>[^/]+)$");
        assert_eq!(
            compiled.tokens(),
            &[
                Token::Text("/users".into()),
                Token::Variable {
                    prefix: "/".into(),
                    pattern: "[^/]+".into(),
                    name: "id".into(),
                    utf8: true,
                },
            ]
        );
        assert!(!compiled.regex().is_match("/users/"));
    }

    #[test]
    fn test_nested_optional_suffix() {
        let route = Route::new(["GET"], "a/{b?}/{c?}");
        let compiled = compile(&route);

        assert_eq!(
            compiled.regex().as_str(),
            "(?s)^/a(?:/(?P<b>[^/]+)(?:/(?P<c>[^/]+))?)?$"
        );
        for path in ["/a", "/a/5", "/a/5/6"] {
            assert!(compiled.regex().is_match(path), "{path}");
        }
        assert!(!compiled.regex().is_match("/a/5/6/7"));
    }

    #[test]
    fn test_lone_optional_variable() {
        let route = Route::new(["GET"], "{page?}");
        let compiled = compile(&route);

        assert_eq!(compiled.regex().as_str(), "(?s)^/(?P<page>[^/]+)?$");
        assert!(compiled.regex().is_match("/"));
        assert!(compiled.regex().is_match("/2"));
        assert_eq!(compiled.static_prefix(), "");
    }

    #[test]
    fn test_next_separator_excluded() {
        let route = Route::new(["GET"], "{page}.{_format}");
        let compiled = compile(&route);

        assert_eq!(
            compiled.regex().as_str(),
            r"(?s)^/(?P<page>[^/\.]+)\.(?P<_format>[^/]+)$"
        );
        let caps = compiled.regex().captures("/index.html").unwrap();
        assert_eq!(&caps["page"], "index");
        assert_eq!(&caps["_format"], "html");
    }

    #[test]
    fn test_host_pattern_is_case_insensitive() {
        let mut route = Route::new(["GET"], "/");
        route.set_domain("{account}.example.com");
        let compiled = compile(&route);

        let host = compiled.host_regex().unwrap();
        assert_eq!(host.as_str(), r"(?s)^(?P<account>[^\.]+)\.example\.com$");
        assert!(host.is_match("ACME.Example.COM"));
        assert_eq!(compiled.host_variables(), &["account".to_string()]);
        assert!(compiled.path_variables().is_empty());
    }

    #[test]
    fn test_requirement_groups_become_non_capturing() {
        let mut route = Route::new(["GET"], "posts/{slug}");
        route.where_("slug", "^(draft|live)-(\\d+)$");
        let compiled = compile(&route);

        assert_eq!(
            compiled.regex().as_str(),
            r"(?s)^/posts/(?P<slug>(?:draft|live)-(?:\d+))$"
        );
        assert_eq!(compiled.regex().captures_len(), 2);
    }

    #[test]
    fn test_transform_keeps_special_groups() {
        assert_eq!(transform_capturing_groups_to_non_capturings("(a)"), "(?:a)");
        assert_eq!(transform_capturing_groups_to_non_capturings("(?i)a"), "(?i)a");
        assert_eq!(transform_capturing_groups_to_non_capturings(r"\(a\)"), r"\(a\)");
        assert_eq!(transform_capturing_groups_to_non_capturings("(*a)"), "(*a)");
    }

    #[test]
    fn test_inline_options() {
        let inline = extract_inline_options(r"/posts/{id<\d+>}/{page?1}/{tab?}");
        assert_eq!(inline.template, "/posts/{id}/{page}/{tab}");
        assert_eq!(inline.requirements.get("id").unwrap(), r"\d+");
        assert_eq!(inline.optionals.get("page").unwrap(), "1");
        assert_eq!(inline.optionals.get("tab").unwrap(), "");
    }

    #[test]
    fn test_static_prefix_keeps_non_slash_separator() {
        let route = Route::new(["GET"], "files/report.{ext}");
        let compiled = compile(&route);
        assert_eq!(compiled.static_prefix(), "/files/report.");

        let route = Route::new(["GET"], "files/report.{ext?}");
        let compiled = compile(&route);
        assert_eq!(compiled.static_prefix(), "/files/report");
    }

    #[test]
    fn test_explicit_default_makes_trailing_variable_optional() {
        let mut route = Route::new(["GET"], "users/{id}");
        route.default("id", "5");
        let compiled = compile(&route);

        assert!(compiled.regex().is_match("/users"));
        assert!(compiled.regex().is_match("/users/9"));
        assert_eq!(compiled.defaults().get("id").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_explicit_default_before_required_variable_stays_required() {
        let mut route = Route::new(["GET"], "posts/{post}/comments/{comment}");
        route.default("post", "1");
        let compiled = compile(&route);

        assert!(!compiled.regex().is_match("/posts/comments/4"));
        assert!(!compiled.regex().is_match("/posts"));
        assert!(compiled.regex().is_match("/posts/3/comments/4"));
    }

    #[test]
    fn test_explicit_default_drops_separator_from_static_prefix() {
        let mut route = Route::new(["GET"], "files/report.{ext}");
        route.default("ext", "pdf");
        let compiled = compile(&route);
        assert_eq!(compiled.static_prefix(), "/files/report");
        assert!(compiled.regex().is_match("/files/report"));
    }

    #[test]
    fn test_nested_braces_match_innermost() {
        let route = Route::new(["GET"], "x/{a{b}}");
        let compiled = compile(&route);
        assert_eq!(compiled.path_variables(), &["b".to_string()]);
        assert!(compiled.regex().is_match("/x/{a7}"));
    }

    #[test]
    fn test_duplicate_variable() {
        let route = Route::new(["GET"], "a/{x}/{x}");
        let err = RouteCompiler::new(&route).compile().unwrap_err();
        assert!(matches!(err, RouteError::DuplicateVariable { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_duplicate_across_host_and_path() {
        let mut route = Route::new(["GET"], "{tenant}/home");
        route.set_domain("{tenant}.example.com");
        let err = RouteCompiler::new(&route).compile().unwrap_err();
        assert!(matches!(err, RouteError::DuplicateVariable { .. }));
    }

    #[test]
    fn test_invalid_names() {
        let route = Route::new(["GET"], "a/{1st}");
        assert!(matches!(
            RouteCompiler::new(&route).compile(),
            Err(RouteError::VariableStartsWithDigit { .. })
        ));

        let long = "v".repeat(VARIABLE_MAXIMUM_LENGTH + 1);
        let route = Route::new(["GET"], format!("a/{{{long}}}"));
        assert!(matches!(
            RouteCompiler::new(&route).compile(),
            Err(RouteError::VariableTooLong { max: 32, .. })
        ));

        let route = Route::new(["GET"], "a/{_fragment}");
        assert!(matches!(
            RouteCompiler::new(&route).compile(),
            Err(RouteError::ReservedVariable { .. })
        ));
    }

    #[test]
    fn test_fragment_allowed_in_host() {
        let mut route = Route::new(["GET"], "/");
        route.set_domain("{_fragment}.example.com");
        assert!(RouteCompiler::new(&route).compile().is_ok());
    }

    #[test]
    fn test_empty_requirement() {
        let mut route = Route::new(["GET"], "a/{x}");
        route.where_("x", "^$");
        assert!(matches!(
            RouteCompiler::new(&route).compile(),
            Err(RouteError::EmptyRequirement { ref name }) if name == "x"
        ));
    }

    #[test]
    fn test_utf8_option() {
        let mut route = Route::new(["GET"], "café/{x}");
        route.utf8(false);
        assert!(matches!(
            RouteCompiler::new(&route).compile(),
            Err(RouteError::Utf8Pattern { .. })
        ));

        let mut route = Route::new(["GET"], "tag/{x}");
        route.utf8(false).where_("x", r"\p{L}+");
        assert!(matches!(
            RouteCompiler::new(&route).compile(),
            Err(RouteError::Utf8Requirement { .. })
        ));

        let mut route = Route::new(["GET"], "tag/{x}");
        route.where_("x", r"\p{L}+");
        let compiled = compile(&route);
        assert!(compiled.regex().is_match("/tag/été"));
    }
}
