//! The fixed sequence of steps every matched request goes through.
//!
//! The chain is compiled once from the server-wide services:
//!
//! ```text
//! before-resource (server) .. -> invoke resource -> after-resource (server) ..
//! ```
//!
//! Invoking the resource expands at request time into the matched resource's
//! scoped before-resource hooks (`All` then method), its method handler and its
//! scoped after-resource hooks (`All` then method).

use crate::context::RequestContext;
use crate::error::{HandlerResult, HttpError};
use crate::service::{AfterResourceHook, BeforeResourceHook, Bound, ServiceBuckets};
use std::fmt;
use tracing::{debug, trace};

#[derive(Clone)]
enum Step {
    BeforeResource(Bound<dyn BeforeResourceHook>),
    InvokeResource,
    AfterResource(Bound<dyn AfterResourceHook>),
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::BeforeResource(bound) => write!(f, "before_resource({})", bound.service),
            Step::InvokeResource => f.write_str("invoke_resource"),
            Step::AfterResource(bound) => write!(f, "after_resource({})", bound.service),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LifecycleChain {
    steps: Vec<Step>,
}

impl LifecycleChain {
    /// Compiles the chain around the server-wide service buckets.
    pub fn new(services: &ServiceBuckets) -> Self {
        let steps = services
            .before_resource()
            .iter()
            .cloned()
            .map(Step::BeforeResource)
            .chain(std::iter::once(Step::InvokeResource))
            .chain(services.after_resource().iter().cloned().map(Step::AfterResource))
            .collect();
        Self { steps }
    }

    /// Human readable step names, in execution order.
    pub fn describe(&self) -> Vec<String> {
        self.steps.iter().map(|step| format!("{step:?}")).collect()
    }

    /// Runs the chain for a request whose resource has been matched.
    ///
    /// Stops at the first failing step. Once the context has ended early no
    /// further step runs and the chain reports success.
    pub async fn run(&self, ctx: &mut RequestContext) -> HandlerResult {
        for step in &self.steps {
            if ctx.has_ended_early() {
                debug!(step = ?step, "lifecycle ended early");
                return Ok(());
            }
            trace!(step = ?step, "running lifecycle step");
            match step {
                Step::BeforeResource(bound) => bound.hook.run_before_resource(ctx).await?,
                Step::InvokeResource => invoke_resource(ctx).await?,
                Step::AfterResource(bound) => bound.hook.run_after_resource(ctx).await?,
            }
        }
        Ok(())
    }
}

async fn invoke_resource(ctx: &mut RequestContext) -> HandlerResult {
    let Some(resource) = ctx.matched_resource() else {
        return Err(HttpError::internal());
    };
    let method = ctx.request().method().clone();

    for bucket in resource.services().scoped(&method) {
        bucket.run_before_resource(ctx).await?;
    }
    if ctx.has_ended_early() {
        return Ok(());
    }

    let Some(handler) = resource.handler(&method) else {
        return Err(HttpError::method_not_implemented(method, ctx.request().path()));
    };
    handler.handle(ctx).await?;

    for bucket in resource.services().scoped(&method) {
        if ctx.has_ended_early() {
            break;
        }
        bucket.run_after_resource(ctx).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::resource::{MethodHandler, Resource, ResourceRegistry};
    use crate::service::{MockAfterResourceHook, MockBeforeResourceHook, Service, ServiceScope};
    use async_trait::async_trait;
    use http::{Method, StatusCode};
    use std::sync::{Arc, Mutex};

    /// Records every step it runs through into a shared log.
    #[derive(Clone)]
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        end_early: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self { name, log: Arc::clone(log), end_early: false }
        }

        fn ending_early(mut self) -> Self {
            self.end_early = true;
            self
        }

        fn record(&self, phase: &str, ctx: &mut RequestContext) {
            self.log.lock().unwrap().push(format!("{}:{phase}", self.name));
            if self.end_early {
                ctx.mark_ended_early();
            }
        }
    }

    #[async_trait]
    impl BeforeResourceHook for Recorder {
        async fn run_before_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
            self.record("before", ctx);
            Ok(())
        }
    }

    #[async_trait]
    impl AfterResourceHook for Recorder {
        async fn run_after_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
            self.record("after", ctx);
            Ok(())
        }
    }

    #[async_trait]
    impl MethodHandler for Recorder {
        async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
            self.record("handle", ctx);
            Ok(())
        }
    }

    fn hooks(recorder: Recorder) -> Service {
        Service::builder(recorder.name).before_resource(recorder.clone()).after_resource(recorder).build()
    }

    fn matched_context(resource: Resource, method: Method) -> RequestContext {
        let mut registry = ResourceRegistry::new();
        let registered = Arc::clone(registry.register(resource).unwrap());
        let request = http::Request::builder().method(method).uri("/coffee").body("").unwrap();
        let mut ctx = RequestContext::new(Request::from(request));
        ctx.set_match(registered, Default::default());
        ctx
    }

    #[test]
    fn test_chain_layout() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let services = [hooks(Recorder::new("auth", &log)), Service::builder("inert").build()];
        let chain = LifecycleChain::new(&ServiceBuckets::classify(&services));

        assert_eq!(chain.describe(), ["before_resource(auth)", "invoke_resource", "after_resource(auth)"]);
    }

    #[tokio::test]
    async fn test_full_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let services = [hooks(Recorder::new("server", &log))];
        let chain = LifecycleChain::new(&ServiceBuckets::classify(&services));

        let resource = Resource::builder("coffee")
            .path("/coffee")
            .get(Recorder::new("resource", &log))
            .service(Method::GET, hooks(Recorder::new("get", &log)))
            .service(Method::POST, hooks(Recorder::new("post", &log)))
            .service(ServiceScope::All, hooks(Recorder::new("all", &log)))
            .build();

        let mut ctx = matched_context(resource, Method::GET);
        chain.run(&mut ctx).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            [
                "server:before",
                "all:before",
                "get:before",
                "resource:handle",
                "all:after",
                "get:after",
                "server:after"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_method_is_not_implemented() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let services = [hooks(Recorder::new("server", &log))];
        let chain = LifecycleChain::new(&ServiceBuckets::classify(&services));

        let resource = Resource::builder("coffee")
            .path("/coffee")
            .post(Recorder::new("resource", &log))
            .service(ServiceScope::All, hooks(Recorder::new("all", &log)))
            .build();

        let mut ctx = matched_context(resource, Method::GET);
        let error = chain.run(&mut ctx).await.unwrap_err();

        assert_eq!(error.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(*log.lock().unwrap(), ["server:before", "all:before"]);
    }

    #[tokio::test]
    async fn test_end_early_skips_remaining_steps() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let services = [
            Service::builder("gate").before_resource(Recorder::new("gate", &log).ending_early()).build(),
            hooks(Recorder::new("server", &log)),
        ];
        let chain = LifecycleChain::new(&ServiceBuckets::classify(&services));

        let resource = Resource::builder("coffee").path("/coffee").get(Recorder::new("resource", &log)).build();
        let mut ctx = matched_context(resource, Method::GET);
        chain.run(&mut ctx).await.unwrap();

        assert!(ctx.has_ended_early());
        assert_eq!(*log.lock().unwrap(), ["gate:before"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_chain() {
        let mut failing = MockBeforeResourceHook::new();
        failing.expect_run_before_resource().times(1).returning(|_| Err(HttpError::new(401, "No token")));

        let mut after = MockAfterResourceHook::new();
        after.expect_run_after_resource().never();

        let services =
            [Service::builder("auth").before_resource(failing).build(), Service::builder("after").after_resource(after).build()];
        let chain = LifecycleChain::new(&ServiceBuckets::classify(&services));

        let resource = Resource::builder("coffee").path("/coffee").build();
        let mut ctx = matched_context(resource, Method::GET);
        let error = chain.run(&mut ctx).await.unwrap_err();

        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.to_string(), "No token");
    }
}
