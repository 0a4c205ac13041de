//! Services: cross-cutting hooks plugged into the request lifecycle.
//!
//! A service takes part in up to four phases, one trait per phase:
//!
//! | phase            | trait                  | runs                                            |
//! |------------------|------------------------|-------------------------------------------------|
//! | startup          | [`StartupHook`]        | once, while the application is being built      |
//! | before resource  | [`BeforeResourceHook`] | before the matched resource's method handler    |
//! | after resource   | [`AfterResourceHook`]  | after the method handler returned successfully  |
//! | on error         | [`ErrorHook`]          | after the error handler, on the error path only |
//!
//! A [`Service`] is the record of which of those hooks a service provides,
//! resolved once when it is built. Sharing one instance between several phases
//! is done through `Arc`, which implements every hook trait of its content:
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use drash::service::{BeforeResourceHook, ErrorHook, Service};
//! use drash::{HandlerResult, HttpError, RequestContext};
//!
//! struct Auth;
//!
//! #[async_trait]
//! impl BeforeResourceHook for Auth {
//!     async fn run_before_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
//!         match ctx.request().header("authorization") {
//!             Some(_) => Ok(()),
//!             None => Err(HttpError::new(401, "No token")),
//!         }
//!     }
//! }
//!
//! #[async_trait]
//! impl ErrorHook for Auth {
//!     async fn run_on_error(&self, ctx: &mut RequestContext) -> HandlerResult {
//!         ctx.response_mut().set_header("www-authenticate", "Bearer")?;
//!         Ok(())
//!     }
//! }
//!
//! let auth = Arc::new(Auth);
//! let service = Service::builder("auth").before_resource(Arc::clone(&auth)).on_error(auth).build();
//! assert_eq!(service.name(), "auth");
//! ```

mod buckets;

pub use buckets::{Phase, ResourceServices, ServiceBuckets};
pub(crate) use buckets::Bound;

use crate::context::RequestContext;
use crate::error::HandlerResult;
use crate::resource::{RegisteredResource, ResourceRegistry};
use async_trait::async_trait;
use http::Method;
use std::fmt;
use std::sync::Arc;

/// What a startup hook can see of the application being built.
#[derive(Debug, Clone, Copy)]
pub struct StartupContext<'a> {
    registry: &'a ResourceRegistry,
}

impl<'a> StartupContext<'a> {
    pub(crate) fn new(registry: &'a ResourceRegistry) -> Self {
        Self { registry }
    }

    /// The registered resources, in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &'a RegisteredResource> + use<'a> {
        self.registry.iter().map(Arc::as_ref)
    }

    /// Finds a registered resource by name.
    pub fn resource(&self, name: &str) -> Option<&'a RegisteredResource> {
        self.resources().find(|resource| resource.name() == name)
    }
}

#[async_trait]
pub trait StartupHook: Send + Sync {
    async fn run_at_startup(&self, ctx: &StartupContext<'_>) -> HandlerResult;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeforeResourceHook: Send + Sync {
    /// Runs before the resource; call [`RequestContext::mark_ended_early`] to skip
    /// the rest of the lifecycle, or fail to divert the request to error handling.
    async fn run_before_resource(&self, ctx: &mut RequestContext) -> HandlerResult;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AfterResourceHook: Send + Sync {
    async fn run_after_resource(&self, ctx: &mut RequestContext) -> HandlerResult;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorHook: Send + Sync {
    /// Runs with [`RequestContext::error`] set. A failure here is logged and ignored.
    async fn run_on_error(&self, ctx: &mut RequestContext) -> HandlerResult;
}

#[async_trait]
impl<T: StartupHook + ?Sized> StartupHook for Arc<T> {
    async fn run_at_startup(&self, ctx: &StartupContext<'_>) -> HandlerResult {
        (**self).run_at_startup(ctx).await
    }
}

#[async_trait]
impl<T: BeforeResourceHook + ?Sized> BeforeResourceHook for Arc<T> {
    async fn run_before_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
        (**self).run_before_resource(ctx).await
    }
}

#[async_trait]
impl<T: AfterResourceHook + ?Sized> AfterResourceHook for Arc<T> {
    async fn run_after_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
        (**self).run_after_resource(ctx).await
    }
}

#[async_trait]
impl<T: ErrorHook + ?Sized> ErrorHook for Arc<T> {
    async fn run_on_error(&self, ctx: &mut RequestContext) -> HandlerResult {
        (**self).run_on_error(ctx).await
    }
}

/// A named set of lifecycle hooks.
///
/// A service without any hook is valid, it simply never runs.
#[derive(Clone)]
pub struct Service {
    name: Arc<str>,
    at_startup: Option<Arc<dyn StartupHook>>,
    before_resource: Option<Arc<dyn BeforeResourceHook>>,
    after_resource: Option<Arc<dyn AfterResourceHook>>,
    on_error: Option<Arc<dyn ErrorHook>>,
}

impl Service {
    pub fn builder(name: impl Into<Arc<str>>) -> ServiceBuilder {
        ServiceBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the service provides a hook for `phase`.
    pub fn implements(&self, phase: Phase) -> bool {
        match phase {
            Phase::Startup => self.at_startup.is_some(),
            Phase::BeforeResource => self.before_resource.is_some(),
            Phase::AfterResource => self.after_resource.is_some(),
            Phase::Error => self.on_error.is_some(),
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phases: Vec<_> = Phase::ALL.into_iter().filter(|phase| self.implements(*phase)).collect();
        f.debug_struct("Service").field("name", &self.name).field("phases", &phases).finish()
    }
}

#[derive(Debug)]
pub struct ServiceBuilder {
    service: Service,
}

impl ServiceBuilder {
    fn new(name: Arc<str>) -> Self {
        Self {
            service: Service { name, at_startup: None, before_resource: None, after_resource: None, on_error: None },
        }
    }

    pub fn at_startup<H: StartupHook + 'static>(mut self, hook: H) -> Self {
        self.service.at_startup = Some(Arc::new(hook));
        self
    }

    pub fn before_resource<H: BeforeResourceHook + 'static>(mut self, hook: H) -> Self {
        self.service.before_resource = Some(Arc::new(hook));
        self
    }

    pub fn after_resource<H: AfterResourceHook + 'static>(mut self, hook: H) -> Self {
        self.service.after_resource = Some(Arc::new(hook));
        self
    }

    pub fn on_error<H: ErrorHook + 'static>(mut self, hook: H) -> Self {
        self.service.on_error = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Service {
        self.service
    }
}

/// Where a resource-scoped service applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceScope {
    /// Every request to the resource, whatever its method.
    All,
    /// Only requests with this method.
    Method(Method),
}

impl From<Method> for ServiceScope {
    fn from(method: Method) -> Self {
        ServiceScope::Method(method)
    }
}
