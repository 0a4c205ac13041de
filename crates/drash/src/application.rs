//! The long-lived application object and the request dispatcher.
//!
//! An [`Application`] owns everything built at startup: the compiled resource
//! registry and its match cache, the classified server-wide services, the
//! lifecycle chain and the error handler. It is immutable once built and can be
//! shared between any number of concurrent requests, typically behind an `Arc`.
//!
//! # Example
//! ```
//! use drash::{handler_fn, Application, Resource};
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let app = Application::builder()
//!     .resource(
//!         Resource::builder("coffee")
//!             .path("/coffee/:id")
//!             .get(handler_fn(|ctx| {
//!                 Box::pin(async move {
//!                     let id = ctx.path_param("id").unwrap_or_default().to_string();
//!                     ctx.response_mut().text(format!("coffee #{id}"));
//!                     Ok(())
//!                 })
//!             }))
//!             .build(),
//!     )
//!     .build()
//!     .await
//!     .unwrap();
//!
//! let response = app.handle(http::Request::get("/coffee/17").body("").unwrap()).await;
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body().as_bytes(), b"coffee #17");
//! # }
//! ```

use crate::body::ResponseBody;
use crate::context::RequestContext;
use crate::error::{BuildError, HttpError};
use crate::error_handler::{ErrorHandler, ErrorHandlerProxy};
use crate::lifecycle::LifecycleChain;
use crate::request::Request;
use crate::resource::{Resource, ResourceMatcher, ResourceRegistry};
use crate::response::Response;
use crate::service::{Phase, Service, ServiceBuckets, StartupContext};
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use std::fmt::{self, Display};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ApplicationBuilder {
    resources: Vec<Resource>,
    services: Vec<Service>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("resources", &self.resources)
            .field("services", &self.services)
            .field("custom_error_handler", &self.error_handler.is_some())
            .finish()
    }
}

impl ApplicationBuilder {
    fn new() -> Self {
        Self { resources: Vec::new(), services: Vec::new(), error_handler: None }
    }

    /// Registers a resource; registration order decides which resource wins when
    /// several match the same path.
    pub fn resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Adds a server-wide service. Services run in the order they were added.
    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn services(mut self, services: impl IntoIterator<Item = Service>) -> Self {
        self.services.extend(services);
        self
    }

    /// Replaces the [`DefaultErrorHandler`](crate::DefaultErrorHandler).
    pub fn error_handler(mut self, error_handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(error_handler));
        self
    }

    /// Compiles the resources, classifies the services and runs the startup hooks.
    ///
    /// Server-wide startup hooks run first, in registration order, followed by the
    /// hooks of each resource's scoped services.
    pub async fn build(self) -> Result<Application, BuildError> {
        let mut registry = ResourceRegistry::new();
        for resource in self.resources {
            registry.register(resource)?;
        }

        let services = ServiceBuckets::classify(&self.services);
        let startup = StartupContext::new(&registry);
        services.run_at_startup(&startup).await?;
        for resource in registry.iter() {
            for bucket in resource.services().every_scope() {
                bucket.run_at_startup(&startup).await?;
            }
        }

        let chain = LifecycleChain::new(&services);
        info!(
            resources = ?registry.iter().map(|r| r.name()).collect::<Vec<_>>(),
            before_resource = ?services.names(Phase::BeforeResource),
            after_resource = ?services.names(Phase::AfterResource),
            on_error = ?services.names(Phase::Error),
            "application built"
        );

        let error_handler = self.error_handler.map(ErrorHandlerProxy::new).unwrap_or_default();
        Ok(Application { matcher: ResourceMatcher::new(registry), services, chain, error_handler })
    }
}

#[derive(Debug)]
pub struct Application {
    matcher: ResourceMatcher,
    services: ServiceBuckets,
    chain: LifecycleChain,
    error_handler: ErrorHandlerProxy,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn registry(&self) -> &ResourceRegistry {
        self.matcher.registry()
    }

    pub fn matcher(&self) -> &ResourceMatcher {
        &self.matcher
    }

    /// The server-wide services, classified by phase.
    pub fn services(&self) -> &ServiceBuckets {
        &self.services
    }

    pub fn chain(&self) -> &LifecycleChain {
        &self.chain
    }

    /// Handles a request whose body is already buffered.
    ///
    /// Always produces a response: failures are turned into responses by the
    /// error handler.
    pub async fn handle<B: Into<Bytes>>(&self, request: http::Request<B>) -> http::Response<ResponseBody> {
        self.dispatch(RequestContext::new(Request::from(request))).await.into_http()
    }

    /// Handles a request with a streaming body, buffering it first.
    ///
    /// A body that fails to be read is answered with `400 Bad Request`.
    pub async fn handle_body<B>(&self, request: http::Request<B>) -> http::Response<ResponseBody>
    where
        B: HttpBody,
        B::Error: Display,
    {
        let (parts, body) = request.into_parts();
        match body.collect().await {
            Ok(collected) => self.dispatch(RequestContext::new(Request::new(parts, collected.to_bytes()))).await.into_http(),
            Err(e) => {
                warn!(cause = %e, uri = %parts.uri, "failed to read request body");
                let mut response = Response::new();
                crate::DefaultErrorHandler::write(&HttpError::new(400, "Bad Request"), &mut response);
                response.into_http()
            }
        }
    }

    /// Runs the whole lifecycle for one request and returns its response.
    pub async fn dispatch(&self, mut ctx: RequestContext) -> Response {
        let outcome = match self.matcher.match_url(ctx.request().uri()) {
            Ok(matched) => {
                let (resource, params) = matched.into_parts();
                ctx.set_match(resource, params);
                self.chain.run(&mut ctx).await
            }
            Err(e) => Err(e),
        };

        if let Err(error) = outcome {
            self.handle_error(&mut ctx, error).await;
        }
        ctx.into_response()
    }

    async fn handle_error(&self, ctx: &mut RequestContext, error: HttpError) {
        let status = error.status();
        if status.is_server_error() {
            warn!(method = %ctx.request().method(), path = ctx.request().path(), status = status.as_u16(), cause = %error, "request failed");
        } else {
            debug!(method = %ctx.request().method(), path = ctx.request().path(), status = status.as_u16(), cause = %error, "request failed");
        }

        ctx.set_error(error);
        self.error_handler.handle(ctx).await;

        if let Some(resource) = ctx.matched_resource() {
            let method = ctx.request().method().clone();
            for bucket in resource.services().scoped(&method) {
                bucket.run_on_error(ctx).await;
            }
        }
        self.services.run_on_error(ctx).await;
    }
}
