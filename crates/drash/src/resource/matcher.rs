use super::{RegisteredResource, ResourceRegistry};
use crate::error::HttpError;
use crate::request::PathParams;
use dashmap::DashMap;
use http::Uri;
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// A successful match: the resource and the parameters extracted from the path.
#[derive(Debug, Clone)]
pub struct ResourceMatch {
    resource: Arc<RegisteredResource>,
    params: PathParams,
}

impl ResourceMatch {
    pub fn resource(&self) -> &RegisteredResource {
        &self.resource
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (Arc<RegisteredResource>, PathParams) {
        (self.resource, self.params)
    }
}

/// Resolves request URLs to registered resources.
///
/// Every successful match is remembered by exact URL, query included, so a URL
/// seen before never scans the registry again. Entries are only ever added; two
/// requests racing on the same new URL both scan and store the same result.
/// Misses are not remembered.
#[derive(Debug)]
pub struct ResourceMatcher {
    registry: ResourceRegistry,
    cache: DashMap<String, (usize, PathParams)>,
    scans: AtomicUsize,
}

impl ResourceMatcher {
    pub fn new(registry: ResourceRegistry) -> Self {
        Self { registry, cache: DashMap::new(), scans: AtomicUsize::new(0) }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Matches `uri` against the registry, consulting the cache first.
    ///
    /// Fails with [`HttpError::ResourceNotFound`] when no resource accepts the path.
    pub fn match_url(&self, uri: &Uri) -> Result<ResourceMatch, HttpError> {
        let key = cache_key(uri);

        if let Some(entry) = self.cache.get(&*key) {
            let (index, params) = entry.value();
            if let Some(resource) = self.registry.get(*index) {
                debug!(url = %key, resource = resource.name(), "matched resource from cache");
                return Ok(ResourceMatch { resource: Arc::clone(resource), params: params.clone() });
            }
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        let Some((index, params)) = self.registry.find(uri.path()) else {
            debug!(url = %key, "no resource matched");
            return Err(HttpError::resource_not_found(uri.path()));
        };

        let resource = self.registry.get(index).map(Arc::clone).ok_or_else(HttpError::internal)?;
        debug!(url = %key, resource = resource.name(), params = ?params, "matched resource");
        self.cache.insert(key.into_owned(), (index, params.clone()));
        Ok(ResourceMatch { resource, params })
    }

    /// How many times the registry has been scanned, i.e. the number of cache misses.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    /// Number of distinct URLs remembered.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

fn cache_key(uri: &Uri) -> Cow<'_, str> {
    match (uri.scheme(), uri.path_and_query()) {
        (None, Some(path_and_query)) => Cow::Borrowed(path_and_query.as_str()),
        _ => Cow::Owned(uri.to_string()),
    }
}
