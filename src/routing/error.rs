use thiserror::Error;

use crate::routing::pattern::Verb;

/// Everything the routing engine can refuse to do.
///
/// Routing is deterministic and pure, so none of these are retried; they
/// travel up to the dispatch boundary where they are mapped onto a response
/// shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("method {0} is not available")]
    InvalidVerb(String),

    #[error("no route matches {verb} '{path}'")]
    NoRouteMatch { verb: Verb, path: String },

    #[error("{verb} '{path}' matches more than one route of equal weight")]
    AmbiguousRoute { verb: Verb, path: String },

    #[error("access denied by guard {guard}")]
    AccessDenied { guard: String },

    /// Unreachable through the resolution protocol; seeing it means a route
    /// was asked to extract parameters from a request it never matched.
    #[error("'{path}' did not match pattern '{pattern}'")]
    ParamExtraction { pattern: String, path: String },
}
