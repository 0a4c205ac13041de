//! Drash, a resource-oriented HTTP micro framework.
//!
//! An application is made of [`Resource`]s, each binding one or more URL paths
//! to per-method handlers, and of [`Service`](service::Service)s plugged into the
//! request lifecycle:
//!
//! 1. the request URL is matched against the registered resources,
//! 2. server-wide before-resource hooks run, then the resource's own ones,
//! 3. the resource's handler for the request method runs,
//! 4. the resource's after-resource hooks run, then the server-wide ones.
//!
//! Any failure on the way is handed to the error handler and then to the
//! on-error hooks; every request ends with exactly one response.
//!
//! The crate carries no transport: [`Application::handle`] takes an
//! [`http::Request`] and returns an [`http::Response`], leaving the wire to
//! whichever server the application is mounted into.

mod application;
mod body;
mod context;
mod error;
mod error_handler;
mod lifecycle;
mod logging;
mod request;
mod response;

pub mod path;
pub mod resource;
pub mod service;
pub mod status;

pub use application::{Application, ApplicationBuilder};
pub use body::ResponseBody;
pub use context::RequestContext;
pub use error::{BuildError, HandlerResult, HttpError};
pub use error_handler::{DefaultErrorHandler, ErrorHandler, ErrorHandlerProxy};
pub use lifecycle::LifecycleChain;
pub use logging::init_logging;
pub use request::{PathParams, Request};
pub use resource::{FnHandler, MethodHandler, Resource, ResourceBuilder, handler_fn};
pub use response::Response;
pub use service::{Service, ServiceScope};
