use crate::auth::{AuthContext, Guard};
use crate::routing::error::RoutingError;
use crate::routing::params::RouteParams;
use crate::routing::pattern::{PathPattern, Verb};
use crate::routing::route::{BoxedHandler, Route};

/// A successful resolution: the winning route plus its extracted parameters.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub route: &'a Route,
    pub params: RouteParams,
}

/// Outcome of the registration scan, computed against an immutable view of
/// the table and applied as a single mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegisterOp {
    Replace(usize),
    InsertAt(usize),
    Append,
}

/// Ordered route table for one resource namespace.
///
/// Routes are kept in non-decreasing weight order as a side effect of the
/// insertion protocol, so a left-to-right scan meets more specific routes
/// first. The table is meant to be built during an initialization phase and
/// read concurrently afterwards; hot re-registration needs external locking.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `(verb, path)`.
    ///
    /// A registration whose pattern is structurally equal to an existing
    /// route replaces that route in place, keeping its position; re-binding
    /// a shape never duplicates it or perturbs the scan order. Otherwise the
    /// route is inserted before the first strictly heavier route, or
    /// appended.
    pub fn register(&mut self, verb: Verb, path: &str, handler: BoxedHandler, guards: Vec<Guard>) {
        let route = Route::new(PathPattern::new(verb, path), handler, guards);
        match self.decide(route.pattern()) {
            RegisterOp::Replace(index) => {
                tracing::debug!(pattern = %route.pattern(), "replacing route");
                self.routes[index] = route;
            }
            RegisterOp::InsertAt(index) => self.routes.insert(index, route),
            RegisterOp::Append => self.routes.push(route),
        }
    }

    fn decide(&self, pattern: &PathPattern) -> RegisterOp {
        if let Some(index) = self
            .routes
            .iter()
            .position(|route| route.pattern().structurally_equals(pattern))
        {
            return RegisterOp::Replace(index);
        }

        let weight = pattern.weight();
        match self
            .routes
            .iter()
            .position(|route| route.pattern().weight() > weight)
        {
            Some(index) => RegisterOp::InsertAt(index),
            None => RegisterOp::Append,
        }
    }

    /// Appends a route without the structural-equality scan or the weight
    /// ordering. Exists so tests can build deliberately broken tables;
    /// everything else goes through [`register`](Self::register).
    #[doc(hidden)]
    pub fn append_unchecked(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Resolves `(verb, path)` to exactly one route, or fails.
    ///
    /// The scan tracks the best candidate so far: a later match wins only
    /// with a strictly lower weight, and an equal-weight match is a genuine
    /// ambiguity reported immediately. Because registration keeps the table
    /// weight-ordered, the first match is already the best candidate; the
    /// scan only has to detect same-weight collisions, not re-sort.
    ///
    /// The winning route's guards run in declared order before any
    /// parameters are extracted; the first refusal aborts the resolution.
    pub fn resolve(
        &self,
        verb: Verb,
        path: &str,
        ctx: &AuthContext,
    ) -> Result<Resolution<'_>, RoutingError> {
        let request = PathPattern::new(verb, path);

        let mut best: Option<(usize, usize)> = None;
        for (index, route) in self.routes.iter().enumerate() {
            if !route.pattern().matches(&request) {
                continue;
            }
            let weight = route.pattern().weight();
            match best {
                None => best = Some((index, weight)),
                Some((_, best_weight)) if weight < best_weight => best = Some((index, weight)),
                Some((_, best_weight)) if weight == best_weight => {
                    return Err(RoutingError::AmbiguousRoute {
                        verb,
                        path: path.to_string(),
                    });
                }
                // strictly heavier than the current best: already worse
                Some(_) => {}
            }
        }

        let (index, _) = best.ok_or_else(|| RoutingError::NoRouteMatch {
            verb,
            path: path.to_string(),
        })?;
        let route = &self.routes[index];

        for guard in route.guards() {
            if !guard.authorize(ctx) {
                tracing::debug!(pattern = %route.pattern(), guard = %guard.name(), "guard refused request");
                return Err(RoutingError::AccessDenied {
                    guard: guard.name(),
                });
            }
        }

        let params = route.pattern().extract_params(&request)?;
        Ok(Resolution { route, params })
    }

    /// Drops every registered route. Used between test scenarios and for
    /// wholesale redefinition of a namespace.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
