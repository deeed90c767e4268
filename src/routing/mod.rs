pub mod error;
pub mod params;
pub mod pattern;
pub mod route;
pub mod router;

pub use error::RoutingError;
pub use params::RouteParams;
pub use pattern::{PathPattern, Verb};
pub use route::{handler_fn, BoxedHandler, Handler, HandlerResult, Route};
pub use router::{Resolution, Router};
