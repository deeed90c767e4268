use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::auth::Guard;
use crate::error::ApiError;
use crate::routing::params::RouteParams;
use crate::routing::pattern::PathPattern;

/// Serialized response body, or the error the dispatch boundary will shape
/// into a response.
pub type HandlerResult = Result<String, ApiError>;

/// A unit of application logic bound to a route.
///
/// Resolved at registration time; the router never looks handlers up by
/// name. Closures returning a boxed future get a blanket implementation, so
/// most call sites go through [`handler_fn`].
pub trait Handler: Send + Sync {
    fn call(&self, params: RouteParams, body: Value) -> BoxFuture<'static, HandlerResult>;
}

impl<F> Handler for F
where
    F: Fn(RouteParams, Value) -> BoxFuture<'static, HandlerResult> + Send + Sync,
{
    fn call(&self, params: RouteParams, body: Value) -> BoxFuture<'static, HandlerResult> {
        (self)(params, body)
    }
}

pub type BoxedHandler = Arc<dyn Handler>;

/// Wraps an async closure into a [`BoxedHandler`].
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(RouteParams, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |params: RouteParams, body: Value| -> BoxFuture<'static, HandlerResult> {
        Box::pin(f(params, body))
    })
}

/// A pattern bound to a handler and the ordered guard checks that gate it.
#[derive(Clone)]
pub struct Route {
    pattern: PathPattern,
    handler: BoxedHandler,
    guards: Vec<Guard>,
}

impl Route {
    pub fn new(pattern: PathPattern, handler: BoxedHandler, guards: Vec<Guard>) -> Self {
        Self {
            pattern,
            handler,
            guards,
        }
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}
