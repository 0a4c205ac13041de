use super::{MethodHandler, Resource};
use crate::error::BuildError;
use crate::path::{self, PathPattern};
use crate::request::PathParams;
use crate::service::ResourceServices;
use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A resource whose paths have been compiled, ready for matching.
pub struct RegisteredResource {
    name: String,
    paths: Vec<String>,
    patterns: Vec<PathPattern>,
    handlers: HashMap<Method, Arc<dyn MethodHandler>>,
    services: ResourceServices,
}

impl RegisteredResource {
    pub(crate) fn compile(resource: Resource) -> Result<Self, BuildError> {
        let Resource { name, paths, handlers, services } = resource;

        if paths.is_empty() {
            return Err(BuildError::MissingPaths { resource: name });
        }

        let mut patterns = Vec::with_capacity(paths.len());
        for source in &paths {
            match path::compile(source) {
                Ok(compiled) => patterns.extend(compiled),
                Err(source) => return Err(BuildError::InvalidPath { resource: name, source }),
            }
        }
        // stable: declaration order survives within each kind
        patterns.sort_by_key(PathPattern::kind);

        let services = ResourceServices::classify(&services);
        Ok(Self { name, paths, patterns, handlers, services })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The compiled matcher variants, in the order they are tried.
    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn has_handler(&self, method: &Method) -> bool {
        self.handlers.contains_key(method)
    }

    /// The methods this resource has a handler for, sorted by name.
    pub fn allowed_methods(&self) -> Vec<&Method> {
        let mut methods: Vec<_> = self.handlers.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    pub fn services(&self) -> &ResourceServices {
        &self.services
    }

    pub(crate) fn handler(&self, method: &Method) -> Option<&dyn MethodHandler> {
        self.handlers.get(method).map(Arc::as_ref)
    }

    /// Tries every strict variant, then every optional one, then every wildcard,
    /// each group in declaration order, and returns the first match.
    pub fn match_path(&self, pathname: &str) -> Option<PathParams> {
        self.patterns.iter().find_map(|pattern| pattern.match_path(pathname))
    }
}

impl fmt::Debug for RegisteredResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredResource")
            .field("name", &self.name)
            .field("paths", &self.paths)
            .field("methods", &self.allowed_methods())
            .finish_non_exhaustive()
    }
}

/// The resources of an application, in registration order.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Arc<RegisteredResource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource: Resource) -> Result<&Arc<RegisteredResource>, BuildError> {
        let registered = RegisteredResource::compile(resource)?;
        debug!(resource = %registered.name, paths = ?registered.paths, "registered resource");
        self.resources.push(Arc::new(registered));
        Ok(&self.resources[self.resources.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegisteredResource>> {
        self.resources.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<RegisteredResource>> {
        self.resources.get(index)
    }

    /// Finds the first resource, in registration order, matching `pathname`.
    ///
    /// Returns the index of the resource alongside the extracted parameters.
    pub fn find(&self, pathname: &str) -> Option<(usize, PathParams)> {
        self.resources
            .iter()
            .enumerate()
            .find_map(|(index, resource)| resource.match_path(pathname).map(|params| (index, params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::error::HandlerResult;
    use crate::path::PatternKind;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl MethodHandler for Noop {
        async fn handle(&self, _ctx: &mut RequestContext) -> HandlerResult {
            Ok(())
        }
    }

    fn resource(name: &str, paths: &[&str]) -> Resource {
        Resource::builder(name).paths(paths.iter().copied()).build()
    }

    #[test]
    fn test_compile_rejects_missing_paths() {
        let error = RegisteredResource::compile(resource("empty", &[])).unwrap_err();
        assert!(matches!(error, BuildError::MissingPaths { resource } if resource == "empty"));
    }

    #[test]
    fn test_compile_rejects_empty_path() {
        let error = RegisteredResource::compile(resource("blank", &["/ok", ""])).unwrap_err();
        assert!(matches!(error, BuildError::InvalidPath { resource, .. } if resource == "blank"));
    }

    #[test]
    fn test_compile_groups_variants_by_kind() {
        let registered =
            RegisteredResource::compile(resource("users", &["/people/*", "/users/:name?", "/members/:id"])).unwrap();
        let variants: Vec<_> = registered.patterns().iter().map(|p| (p.kind(), p.source())).collect();
        assert_eq!(
            variants,
            [
                (PatternKind::Strict, "/users/:name?"),
                (PatternKind::Strict, "/members/:id"),
                (PatternKind::Optional, "/users/:name?"),
                (PatternKind::Wildcard, "/people/*"),
            ]
        );
    }

    #[test]
    fn test_strict_path_beats_earlier_wildcard() {
        let registered = RegisteredResource::compile(resource("files", &["/files/*", "/files/:id"])).unwrap();
        let params = registered.match_path("/files/7").unwrap();
        assert_eq!(params.get("id"), Some("7"));

        let params = registered.match_path("/files/7/raw").unwrap();
        assert!(!params.contains("id"));
    }

    #[test]
    fn test_strict_path_beats_earlier_optional() {
        let registered = RegisteredResource::compile(resource("users", &["/u/:a?/:b?", "/u/:id"])).unwrap();
        let params = registered.match_path("/u/9").unwrap();
        assert_eq!(params.get("id"), Some("9"));
        assert!(!params.contains("a"));

        let params = registered.match_path("/u").unwrap();
        assert!(!params.contains("id"));
        assert_eq!(params.get("a"), None);
    }

    #[test]
    fn test_paths_are_tried_in_declaration_order() {
        let registered = RegisteredResource::compile(resource("coffee", &["/coffee/:id", "/coffee/:name"])).unwrap();
        let params = registered.match_path("/coffee/17").unwrap();
        assert_eq!(params.get("id"), Some("17"));
        assert!(!params.contains("name"));
    }

    #[test]
    fn test_first_registered_resource_wins() {
        let mut registry = ResourceRegistry::new();
        registry.register(resource("by-id", &["/coffee/:id"])).unwrap();
        registry.register(resource("latte", &["/coffee/latte"])).unwrap();
        registry.register(resource("tea", &["/tea"])).unwrap();
        assert_eq!(registry.len(), 3);

        let (index, params) = registry.find("/coffee/latte").unwrap();
        assert_eq!(registry.get(index).unwrap().name(), "by-id");
        assert_eq!(params.get("id"), Some("latte"));

        let (index, params) = registry.find("/tea/").unwrap();
        assert_eq!(index, 2);
        assert!(params.is_empty());

        assert!(registry.find("/juice").is_none());
    }

    #[test]
    fn test_allowed_methods() {
        let registered = RegisteredResource::compile(
            Resource::builder("coffee")
                .path("/coffee")
                .post(Noop)
                .get(Noop)
                .build(),
        )
        .unwrap();

        assert_eq!(registered.allowed_methods(), [&Method::GET, &Method::POST]);
        assert!(registered.handler(&Method::GET).is_some());
        assert!(registered.handler(&Method::PUT).is_none());
    }
}
