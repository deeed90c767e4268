use std::fmt;
use std::str::FromStr;

use crate::routing::error::RoutingError;
use crate::routing::params::RouteParams;

/// HTTP verbs accepted by the routing engine. Anything else is rejected at
/// the boundary with [`RoutingError::InvalidVerb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl FromStr for Verb {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "DELETE" => Ok(Verb::Delete),
            other => Err(RoutingError::InvalidVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks a path segment as a named parameter: `$id`, `$name`, ...
const PARAM_SIGIL: char = '$';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Parameter name with the sigil stripped.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Segment {
        match raw.strip_prefix(PARAM_SIGIL) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }

    fn raw(&self) -> String {
        match self {
            Segment::Literal(text) => text.clone(),
            Segment::Param(name) => format!("{PARAM_SIGIL}{name}"),
        }
    }

    fn is_param(&self) -> bool {
        matches!(self, Segment::Param(_))
    }
}

/// A parsed `(verb, path)` pair.
///
/// Built once at registration time and never mutated. Incoming requests are
/// parsed through the same type; their segments are simply all literals
/// (unless the caller sends a `$`-prefixed path segment, which round-trips
/// unchanged through [`extract_params`](Self::extract_params)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    verb: Verb,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Normalizes `raw_path` (leading/trailing `/` trimmed, split on `/`,
    /// empty string yields zero segments) and parses each segment.
    pub fn new(verb: Verb, raw_path: &str) -> Self {
        let trimmed = raw_path.trim_matches('/');
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').map(Segment::parse).collect()
        };

        Self { verb, segments }
    }

    /// Parses the verb from a raw method string first; the only fallible
    /// part of construction.
    pub fn parse(method: &str, raw_path: &str) -> Result<Self, RoutingError> {
        Ok(Self::new(method.parse()?, raw_path))
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Specificity rank: the number of parameter segments. Fewer parameters
    /// means more specific, so lower weights are tried first.
    pub fn weight(&self) -> usize {
        self.segments.iter().filter(|s| s.is_param()).count()
    }

    /// Request-vs-pattern test: same verb, same segment count, and at every
    /// index either the literal text is equal or this side holds a
    /// parameter placeholder (which accepts any concrete value).
    pub fn matches(&self, request: &PathPattern) -> bool {
        if self.verb != request.verb || self.segments.len() != request.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&request.segments)
            .all(|(own, req)| own.is_param() || own == req)
    }

    /// Pattern-vs-pattern test used at registration time to decide
    /// replace-vs-append: two patterns share a route shape only when their
    /// parameter positions line up exactly. Parameter names are ignored;
    /// a literal facing a parameter is never compatible.
    pub fn structurally_equals(&self, other: &PathPattern) -> bool {
        if self.verb != other.verb || self.segments.len() != other.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(own, theirs)| (own.is_param() && theirs.is_param()) || own == theirs)
    }

    /// Pulls the named parameter values out of a matching request, in
    /// left-to-right segment order.
    ///
    /// The caller must have established [`matches`](Self::matches); a
    /// violation means the resolution protocol is broken and is reported as
    /// an internal inconsistency.
    pub fn extract_params(&self, request: &PathPattern) -> Result<RouteParams, RoutingError> {
        if !self.matches(request) {
            return Err(RoutingError::ParamExtraction {
                pattern: self.path(),
                path: request.path(),
            });
        }

        let mut params = RouteParams::new();
        for (own, req) in self.segments.iter().zip(&request.segments) {
            if let Segment::Param(name) = own {
                params.push(name.clone(), req.raw());
            }
        }

        Ok(params)
    }

    /// The normalized path text, without a leading slash. Used in error
    /// messages and logs.
    pub fn path(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.raw())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.verb, self.path())
    }
}
