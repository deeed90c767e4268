use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::routing::{Router, Verb};

/// Top-level orchestration: picks the resource namespace off the front of
/// the path, hands the remainder to that namespace's [`Router`], and
/// invokes the resolved handler.
///
/// The namespace table is meant to be populated once at startup and shared
/// read-only with the request path afterwards.
#[derive(Debug, Default)]
pub struct RequestDispatcher {
    namespaces: HashMap<String, Router>,
}

impl RequestDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The router for `name`, created empty on first use.
    pub fn namespace_mut(&mut self, name: &str) -> &mut Router {
        self.namespaces.entry(name.to_string()).or_default()
    }

    pub fn namespace(&self, name: &str) -> Option<&Router> {
        self.namespaces.get(name)
    }

    /// Routes one request end to end.
    ///
    /// The first path segment selects the namespace; the remainder, the
    /// verb and the body go to its router and the winning handler. Routing
    /// errors surface unchanged (wrapped into the response-shaped
    /// [`ApiError`] taxonomy); nothing is retried here.
    pub async fn dispatch(
        &self,
        method: &str,
        full_path: &str,
        raw_body: &str,
        ctx: &AuthContext,
    ) -> Result<String, ApiError> {
        let verb = Verb::from_str(method)?;

        let trimmed = full_path.trim_matches('/');
        let (namespace, remainder) = match trimmed.split_once('/') {
            Some((first, rest)) => (first, rest),
            None => (trimmed, ""),
        };

        let router = self.namespaces.get(namespace).ok_or_else(|| {
            ApiError::not_found(format!("no resource registered under '{namespace}'"))
        })?;

        let body = parse_body(raw_body)?;
        let resolution = router.resolve(verb, remainder, ctx)?;

        tracing::debug!(%verb, namespace, path = remainder, "dispatching");
        resolution.route.handler().call(resolution.params, body).await
    }
}

/// An empty body is an empty JSON object; anything else must parse.
fn parse_body(raw: &str) -> Result<Value, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
        .map_err(|e| ApiError::invalid_json(format!("request body is not valid JSON: {e}")))
}
