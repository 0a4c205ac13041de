//! Path pattern compilation and matching.
//!
//! A declared resource path such as `/users/:id`, `/users/:name?/:age?`,
//! `/posts/{id}` or `/files/*` is compiled into one to three [`PathPattern`]s:
//!
//! - [`PatternKind::Strict`]: every parameter is required and matches one or more
//!   non-slash characters. Built for every path without a wildcard.
//! - [`PatternKind::Optional`]: built when the path declares `?`-suffixed
//!   parameters. The separator in front of each optional parameter becomes
//!   optional too, so `/users/:name?/:age?` matches `/users`, `/users/Tom` and
//!   `/users/Tom/30`.
//! - [`PatternKind::Wildcard`]: built for paths containing `*`, which matches any
//!   remainder of the URL, slashes included. A bare `*` matches every path.
//!
//! The variants are returned in that fixed order, which is their precedence when
//! more than one of them could match the same URL.
//!
//! # Example
//! ```
//! use drash::path::{compile, PatternKind};
//!
//! let patterns = compile("/users/:name?/:age?").unwrap();
//! assert_eq!(patterns.len(), 2);
//! assert_eq!(patterns[0].kind(), PatternKind::Strict);
//! assert_eq!(patterns[1].kind(), PatternKind::Optional);
//!
//! let params = patterns[1].match_path("/users/Tom").unwrap();
//! assert_eq!(params.get("name"), Some("Tom"));
//! assert_eq!(params.get("age"), None);
//! ```

mod segment;

use crate::request::PathParams;
use regex::Regex;
use segment::Segment;
use thiserror::Error;

const PARAM_GROUP: &str = "([^/]+)";
const OPTIONAL_PARAM_GROUP: &str = "([^/]+)?";
const OPTIONAL_SEGMENT_GROUP: &str = "(?:/([^/]+))?";
const WILDCARD: &str = ".*";
const WILDCARD_SEGMENT: &str = "(?:/.*)?";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path must not be empty")]
    Empty,

    #[error("path '{path}' does not compile: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// The matcher variant of a compiled path.
///
/// Variants order by precedence: strict first, wildcard last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternKind {
    Strict,
    Optional,
    Wildcard,
}

/// A declared path compiled into an anchored regex.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    kind: PatternKind,
    regex: Regex,
    param_names: Vec<String>,
}

/// Compiles a declared path into its matcher variants, in precedence order.
pub fn compile(source: &str) -> Result<Vec<PathPattern>, PathError> {
    if source.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let segments = segment::parse(source);

    let kinds: &[PatternKind] = if segments.contains(&Segment::Wildcard) {
        &[PatternKind::Wildcard]
    } else if segments.iter().any(|s| matches!(s, Segment::Param { optional: true, .. })) {
        &[PatternKind::Strict, PatternKind::Optional]
    } else {
        &[PatternKind::Strict]
    };

    kinds.iter().map(|&kind| PathPattern::build(source, kind, &segments)).collect()
}

impl PathPattern {
    fn build(source: &str, kind: PatternKind, segments: &[Segment]) -> Result<Self, PathError> {
        let mut expr = String::from("^");
        let mut param_names = Vec::new();

        for segment in segments {
            match segment {
                Segment::Literal(text) => expr.push_str(&regex::escape(text)),
                Segment::Param { name, optional } => {
                    param_names.push(name.clone());
                    if *optional && kind == PatternKind::Optional {
                        push_optional(&mut expr, OPTIONAL_SEGMENT_GROUP, OPTIONAL_PARAM_GROUP);
                    } else {
                        expr.push_str(PARAM_GROUP);
                    }
                }
                Segment::Wildcard => push_optional(&mut expr, WILDCARD_SEGMENT, WILDCARD),
            }
        }
        expr.push_str("/?$");

        let regex = Regex::new(&expr).map_err(|e| PathError::InvalidPattern { path: source.to_string(), source: e })?;
        Ok(Self { source: source.to_string(), kind, regex, param_names })
    }

    /// Matches a URL pathname, extracting the declared parameters in order.
    ///
    /// Captured values are trimmed; a parameter that captured nothing, or only
    /// whitespace, is present in the result without a value.
    pub fn match_path(&self, pathname: &str) -> Option<PathParams> {
        let captures = self.regex.captures(pathname)?;

        let mut params = PathParams::with_capacity(self.param_names.len());
        for (i, name) in self.param_names.iter().enumerate() {
            let value = captures.get(i + 1).map(|m| m.as_str().trim()).filter(|v| !v.is_empty());
            params.push(name.clone(), value.map(str::to_string));
        }
        Some(params)
    }

    /// Returns true if the pathname matches, without extracting parameters.
    #[inline]
    pub fn is_match(&self, pathname: &str) -> bool {
        self.regex.is_match(pathname)
    }

    /// The path as it was declared.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// The compiled regex, as text.
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Parameter names, in the order they appear in the declared path.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

/// Pushes `after_slash` in place of a preceding `/`, or `bare` when there is none.
fn push_optional(expr: &mut String, after_slash: &str, bare: &str) {
    if expr.ends_with('/') {
        expr.pop();
        expr.push_str(after_slash);
    } else {
        expr.push_str(bare);
    }
}
