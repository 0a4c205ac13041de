use once_cell::sync::Lazy;
use regex::Regex;

/// `:name` or `{name}`, optionally followed by `?`. A `{` directly followed by a
/// digit is literal brace content, not a parameter.
static PARAM_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?::([^/(?*{}]+)|\{([^0-9}/][^}/]*)\})(\?)?").expect("parameter token regex is valid")
});

/// A piece of a declared path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
    Wildcard,
}

/// Splits a declared path into literal, parameter and wildcard segments.
///
/// A trailing slash is dropped, `/` itself becomes an empty path; the matchers
/// accept an optional trailing slash on their own.
pub(crate) fn parse(source: &str) -> Vec<Segment> {
    let source = source.strip_suffix('/').unwrap_or(source);
    let mut segments = Vec::new();
    let mut last = 0;

    for captures in PARAM_TOKEN.captures_iter(source) {
        let Some(token) = captures.get(0) else { continue };
        push_literal(&mut segments, &source[last..token.start()]);

        let name = captures.get(1).or_else(|| captures.get(2)).map(|m| m.as_str().trim().to_string());
        if let Some(name) = name {
            segments.push(Segment::Param { name, optional: captures.get(3).is_some() });
        }
        last = token.end();
    }

    push_literal(&mut segments, &source[last..]);
    segments
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    for (i, part) in text.split('*').enumerate() {
        if i > 0 {
            segments.push(Segment::Wildcard);
        }
        if !part.is_empty() {
            segments.push(Segment::Literal(part.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, optional: bool) -> Segment {
        Segment::Param { name: name.into(), optional }
    }

    fn literal(text: &str) -> Segment {
        Segment::Literal(text.into())
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse("/coffee"), vec![literal("/coffee")]);
        assert_eq!(parse("/coffee/"), vec![literal("/coffee")]);
        assert!(parse("/").is_empty());
    }

    #[test]
    fn test_parse_colon_params() {
        assert_eq!(parse("/coffee/:id"), vec![literal("/coffee/"), param("id", false)]);
        assert_eq!(
            parse("/users/:name?/:age?"),
            vec![literal("/users/"), param("name", true), literal("/"), param("age", true)]
        );
    }

    #[test]
    fn test_parse_brace_params() {
        assert_eq!(
            parse("/posts/{post_id}/comments/{id}?"),
            vec![literal("/posts/"), param("post_id", false), literal("/comments/"), param("id", true)]
        );
    }

    #[test]
    fn test_numeric_brace_is_literal() {
        assert_eq!(parse("/range/{1}"), vec![literal("/range/{1}")]);
    }

    #[test]
    fn test_parse_wildcard() {
        assert_eq!(parse("*"), vec![Segment::Wildcard]);
        assert_eq!(parse("/files/*"), vec![literal("/files/"), Segment::Wildcard]);
        assert_eq!(
            parse("/files/:dir/*"),
            vec![literal("/files/"), param("dir", false), literal("/"), Segment::Wildcard]
        );
    }
}
