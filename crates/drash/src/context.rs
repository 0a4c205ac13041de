//! Per-request state.
//!
//! A [`RequestContext`] is created for every inbound request and owned by that
//! request alone. Every lifecycle hook and method handler receives it mutably, in
//! sequence, never concurrently.

use crate::error::HttpError;
use crate::request::{PathParams, Request};
use crate::resource::RegisteredResource;
use crate::response::Response;
use std::sync::Arc;

#[derive(Debug)]
pub struct RequestContext {
    request: Request,
    response: Response,
    resource: Option<Arc<RegisteredResource>>,
    path_params: PathParams,
    error: Option<HttpError>,
    ended_early: bool,
}

impl RequestContext {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::new(),
            resource: None,
            path_params: PathParams::empty(),
            error: None,
            ended_early: false,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// The resource the request path resolved to, once matching succeeded.
    pub fn resource(&self) -> Option<&RegisteredResource> {
        self.resource.as_deref()
    }

    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Shorthand for `path_params().get(name)`.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// The failure being handled, set only on the error path.
    pub fn error(&self) -> Option<&HttpError> {
        self.error.as_ref()
    }

    /// Ends the lifecycle after the current step.
    ///
    /// No further hook or handler of the lifecycle runs. The response is returned
    /// as it stands, and since ending early is not a failure no on-error hook runs.
    pub fn mark_ended_early(&mut self) {
        self.ended_early = true;
    }

    pub fn has_ended_early(&self) -> bool {
        self.ended_early
    }

    pub(crate) fn set_match(&mut self, resource: Arc<RegisteredResource>, path_params: PathParams) {
        self.resource = Some(resource);
        self.path_params = path_params;
    }

    pub(crate) fn matched_resource(&self) -> Option<Arc<RegisteredResource>> {
        self.resource.clone()
    }

    pub(crate) fn set_error(&mut self, error: HttpError) {
        self.error = Some(error);
    }

    pub(crate) fn take_error(&mut self) -> Option<HttpError> {
        self.error.take()
    }

    /// Splits the context into what an error handler works with.
    pub(crate) fn error_parts(&mut self) -> (&HttpError, &Request, &mut Response) {
        let error = self.error.get_or_insert_with(HttpError::internal);
        (&*error, &self.request, &mut self.response)
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}
