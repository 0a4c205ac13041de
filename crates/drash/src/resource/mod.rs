//! Resources: URL paths bound to per-method handlers.
//!
//! A [`Resource`] is plain data assembled through [`ResourceBuilder`]. Registering
//! it compiles its paths once into a [`RegisteredResource`]; the
//! [`ResourceMatcher`] then resolves request URLs against the registry.

mod matcher;
mod registry;

pub use matcher::{ResourceMatch, ResourceMatcher};
pub use registry::{RegisteredResource, ResourceRegistry};

use crate::context::RequestContext;
use crate::error::HandlerResult;
use crate::service::{Service, ServiceScope};
use async_trait::async_trait;
use futures::future::BoxFuture;
use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handles one HTTP method of a resource.
///
/// The handler writes its result into [`RequestContext::response_mut`]; failing
/// diverts the request to error handling.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult;
}

#[async_trait]
impl<T: MethodHandler + ?Sized> MethodHandler for Arc<T> {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        (**self).handle(ctx).await
    }
}

#[async_trait]
impl<T: MethodHandler + ?Sized> MethodHandler for Box<T> {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        (**self).handle(ctx).await
    }
}

/// A [`MethodHandler`] backed by a closure, see [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Adapts a closure into a [`MethodHandler`].
///
/// ```
/// use drash::{handler_fn, Resource};
///
/// let resource = Resource::builder("coffee")
///     .path("/coffee/:id")
///     .get(handler_fn(|ctx| {
///         Box::pin(async move {
///             let id = ctx.path_param("id").unwrap_or_default().to_string();
///             ctx.response_mut().text(format!("coffee #{id}"));
///             Ok(())
///         })
///     }))
///     .build();
/// assert_eq!(resource.name(), "coffee");
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'c> Fn(&'c mut RequestContext) -> BoxFuture<'c, HandlerResult> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> MethodHandler for FnHandler<F>
where
    F: for<'c> Fn(&'c mut RequestContext) -> BoxFuture<'c, HandlerResult> + Send + Sync,
{
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        (self.f)(ctx).await
    }
}

/// A user resource: its paths, its method handlers and its scoped services.
pub struct Resource {
    pub(crate) name: String,
    pub(crate) paths: Vec<String>,
    pub(crate) handlers: HashMap<Method, Arc<dyn MethodHandler>>,
    pub(crate) services: Vec<(ServiceScope, Service)>,
}

impl Resource {
    pub fn builder(name: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared paths, in declaration order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn has_handler(&self, method: &Method) -> bool {
        self.handlers.contains_key(method)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("paths", &self.paths)
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .field("services", &self.services)
            .finish()
    }
}

#[derive(Debug)]
pub struct ResourceBuilder {
    resource: Resource,
}

macro_rules! method_handler {
    ($method:ident, $method_const:ident) => {
        #[doc = concat!("Sets the handler for `", stringify!($method_const), "` requests.")]
        pub fn $method<H: MethodHandler + 'static>(self, handler: H) -> Self {
            self.handler(Method::$method_const, handler)
        }
    };
}

impl ResourceBuilder {
    fn new(name: String) -> Self {
        Self { resource: Resource { name, paths: Vec::new(), handlers: HashMap::new(), services: Vec::new() } }
    }

    /// Declares a path; declaration order decides precedence within the resource.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.resource.paths.push(path.into());
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the handler for `method`, replacing any previous one.
    pub fn handler<H: MethodHandler + 'static>(mut self, method: Method, handler: H) -> Self {
        self.resource.handlers.insert(method, Arc::new(handler));
        self
    }

    method_handler!(get, GET);
    method_handler!(post, POST);
    method_handler!(put, PUT);
    method_handler!(patch, PATCH);
    method_handler!(delete, DELETE);
    method_handler!(head, HEAD);
    method_handler!(options, OPTIONS);
    method_handler!(connect, CONNECT);
    method_handler!(trace, TRACE);

    /// Scopes a service to this resource, for every method or for one.
    pub fn service(mut self, scope: impl Into<ServiceScope>, service: Service) -> Self {
        self.resource.services.push((scope.into(), service));
        self
    }

    pub fn build(self) -> Resource {
        self.resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::request::Request;

    struct Brew;

    #[async_trait]
    impl MethodHandler for Brew {
        async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
            ctx.response_mut().text("brewing");
            Ok(())
        }
    }

    fn context(uri: &str) -> RequestContext {
        RequestContext::new(Request::from(http::Request::get(uri).body("").unwrap()))
    }

    #[test]
    fn test_builder() {
        let resource = Resource::builder("coffee")
            .path("/coffee")
            .paths(["/coffee/:id", "/drinks/:id"])
            .get(Brew)
            .post(Brew)
            .service(ServiceScope::All, Service::builder("inert").build())
            .service(Method::POST, Service::builder("audit").build())
            .build();

        assert_eq!(resource.name(), "coffee");
        assert_eq!(resource.paths(), ["/coffee", "/coffee/:id", "/drinks/:id"]);
        assert!(resource.has_handler(&Method::GET));
        assert!(resource.has_handler(&Method::POST));
        assert!(!resource.has_handler(&Method::DELETE));
        assert_eq!(resource.services.len(), 2);
        assert_eq!(resource.services[1].0, ServiceScope::Method(Method::POST));
    }

    #[test]
    fn test_handler_replaces_previous() {
        let resource = Resource::builder("coffee").get(Brew).handler(Method::GET, Brew).build();
        assert_eq!(resource.handlers.len(), 1);
    }

    #[tokio::test]
    async fn test_struct_handler() {
        let mut ctx = context("/coffee");
        Brew.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().body().as_ref(), b"brewing");
    }

    #[tokio::test]
    async fn test_handler_fn() {
        let handler = handler_fn(|ctx| {
            Box::pin(async move {
                let tea = ctx.request().query_param("tea").map(str::to_string);
                match tea {
                    Some(tea) => {
                        ctx.response_mut().text(tea);
                        Ok(())
                    }
                    None => Err(HttpError::new(400, "which tea?")),
                }
            })
        });

        let mut ctx = context("/tea?tea=green");
        handler.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().body().as_ref(), b"green");

        let mut ctx = context("/tea");
        let error = handler.handle(&mut ctx).await.unwrap_err();
        assert_eq!(error.status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_shared_handler() {
        let shared: Arc<dyn MethodHandler> = Arc::new(Brew);
        let mut ctx = context("/coffee");
        shared.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().body().as_ref(), b"brewing");
    }
}
