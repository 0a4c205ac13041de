use super::{AfterResourceHook, BeforeResourceHook, ErrorHook, Service, ServiceScope, StartupContext, StartupHook};
use crate::context::RequestContext;
use crate::error::{BuildError, HandlerResult};
use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// A lifecycle phase a service can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Startup,
    BeforeResource,
    AfterResource,
    Error,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Startup, Phase::BeforeResource, Phase::AfterResource, Phase::Error];
}

/// A hook together with the name of the service it came from.
pub(crate) struct Bound<H: ?Sized> {
    pub(crate) service: Arc<str>,
    pub(crate) hook: Arc<H>,
}

impl<H: ?Sized> Clone for Bound<H> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service), hook: Arc::clone(&self.hook) }
    }
}

impl<H: ?Sized> fmt::Debug for Bound<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.service)
    }
}

fn bind<H: ?Sized>(service: &Service, hook: Option<&Arc<H>>) -> Option<Bound<H>> {
    hook.map(|hook| Bound { service: Arc::clone(&service.name), hook: Arc::clone(hook) })
}

/// Services sorted by the phases they take part in.
///
/// A service appears in every bucket it has a hook for; within a bucket services
/// keep the order they were given in.
#[derive(Debug, Clone, Default)]
pub struct ServiceBuckets {
    on_startup: Vec<Bound<dyn StartupHook>>,
    before_resource: Vec<Bound<dyn BeforeResourceHook>>,
    after_resource: Vec<Bound<dyn AfterResourceHook>>,
    on_error: Vec<Bound<dyn ErrorHook>>,
}

impl ServiceBuckets {
    pub fn classify<'a>(services: impl IntoIterator<Item = &'a Service>) -> Self {
        let mut buckets = Self::default();
        for service in services {
            buckets.on_startup.extend(bind(service, service.at_startup.as_ref()));
            buckets.before_resource.extend(bind(service, service.before_resource.as_ref()));
            buckets.after_resource.extend(bind(service, service.after_resource.as_ref()));
            buckets.on_error.extend(bind(service, service.on_error.as_ref()));
        }
        buckets
    }

    /// Names of the services in the bucket of `phase`, in run order.
    pub fn names(&self, phase: Phase) -> Vec<&str> {
        fn names<H: ?Sized>(bucket: &[Bound<H>]) -> Vec<&str> {
            bucket.iter().map(|bound| bound.service.as_ref()).collect()
        }

        match phase {
            Phase::Startup => names(&self.on_startup),
            Phase::BeforeResource => names(&self.before_resource),
            Phase::AfterResource => names(&self.after_resource),
            Phase::Error => names(&self.on_error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.on_startup.is_empty()
            && self.before_resource.is_empty()
            && self.after_resource.is_empty()
            && self.on_error.is_empty()
    }

    pub(crate) fn before_resource(&self) -> &[Bound<dyn BeforeResourceHook>] {
        &self.before_resource
    }

    pub(crate) fn after_resource(&self) -> &[Bound<dyn AfterResourceHook>] {
        &self.after_resource
    }

    pub(crate) async fn run_at_startup(&self, ctx: &StartupContext<'_>) -> Result<(), BuildError> {
        for bound in &self.on_startup {
            trace!(service = %bound.service, "running startup hook");
            bound
                .hook
                .run_at_startup(ctx)
                .await
                .map_err(|source| BuildError::Startup { service: bound.service.to_string(), source })?;
        }
        Ok(())
    }

    /// Runs the before-resource hooks until one fails or ends the lifecycle.
    pub(crate) async fn run_before_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
        for bound in &self.before_resource {
            if ctx.has_ended_early() {
                break;
            }
            trace!(service = %bound.service, "running before-resource hook");
            bound.hook.run_before_resource(ctx).await?;
        }
        Ok(())
    }

    /// Runs the after-resource hooks until one fails or ends the lifecycle.
    pub(crate) async fn run_after_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
        for bound in &self.after_resource {
            if ctx.has_ended_early() {
                break;
            }
            trace!(service = %bound.service, "running after-resource hook");
            bound.hook.run_after_resource(ctx).await?;
        }
        Ok(())
    }

    /// Runs every on-error hook; their failures do not affect the request.
    pub(crate) async fn run_on_error(&self, ctx: &mut RequestContext) {
        for bound in &self.on_error {
            trace!(service = %bound.service, "running on-error hook");
            if let Err(e) = bound.hook.run_on_error(ctx).await {
                warn!(service = %bound.service, cause = %e, "on-error hook failed");
            }
        }
    }
}

/// The services a resource scopes to itself, per [`ServiceScope`].
#[derive(Debug, Clone, Default)]
pub struct ResourceServices {
    all: ServiceBuckets,
    methods: HashMap<Method, ServiceBuckets>,
}

impl ResourceServices {
    pub(crate) fn classify(scoped: &[(ServiceScope, Service)]) -> Self {
        let all = ServiceBuckets::classify(scoped.iter().filter(|(scope, _)| *scope == ServiceScope::All).map(|(_, s)| s));

        let mut grouped: HashMap<&Method, Vec<&Service>> = HashMap::new();
        for (scope, service) in scoped {
            if let ServiceScope::Method(method) = scope {
                grouped.entry(method).or_default().push(service);
            }
        }
        let methods = grouped
            .into_iter()
            .map(|(method, services)| (method.clone(), ServiceBuckets::classify(services)))
            .collect();

        Self { all, methods }
    }

    /// Services applying to every method.
    pub fn all(&self) -> &ServiceBuckets {
        &self.all
    }

    /// Services applying to one method only.
    pub fn method(&self, method: &Method) -> Option<&ServiceBuckets> {
        self.methods.get(method)
    }

    /// The non-empty buckets that apply to a request with `method`: the `All` scope first.
    pub(crate) fn scoped(&self, method: &Method) -> impl Iterator<Item = &ServiceBuckets> {
        std::iter::once(self.all()).chain(self.method(method)).filter(|buckets| !buckets.is_empty())
    }

    /// Every non-empty bucket, for startup: the `All` scope, then methods sorted by name.
    pub(crate) fn every_scope(&self) -> impl Iterator<Item = &ServiceBuckets> {
        let mut methods: Vec<_> = self.methods.iter().collect();
        methods.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        std::iter::once(self.all())
            .chain(methods.into_iter().map(|(_, buckets)| buckets))
            .filter(|buckets| !buckets.is_empty())
    }
}
