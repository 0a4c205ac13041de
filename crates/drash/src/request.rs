//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the inbound side of the pipeline:
//! - `Request`: the request handed over by a transport adapter, with header,
//!   query and body accessors
//! - `PathParams`: the named parameters extracted from the request path by the
//!   matched resource path

use crate::error::HttpError;
use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};
use serde::de::DeserializeOwned;

/// An inbound HTTP request.
///
/// The body is fully buffered; a transport adapter collects it before handing
/// the request to [`Application::handle`](crate::Application::handle).
#[derive(Debug)]
pub struct Request {
    parts: Parts,
    body: Bytes,
    query: Vec<(String, String)>,
}

impl Request {
    /// Creates a new Request from request head parts and a buffered body
    pub fn new(parts: Parts, body: Bytes) -> Self {
        let query = parts
            .uri
            .query()
            .and_then(|query| serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok())
            .unwrap_or_default();
        Self { parts, body, query }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the path component of the request URI
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Returns the value of a header, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the first value of a query string parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Deserializes the whole query string into `T`
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        let query = self.parts.uri.query().unwrap_or_default();
        Ok(serde_urlencoded::from_str(query)?)
    }

    /// Returns the raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the request body as UTF-8 text
    pub fn text(&self) -> Result<&str, HttpError> {
        std::str::from_utf8(&self.body).map_err(|e| HttpError::new(400, format!("body is not valid utf-8: {e}")))
    }

    /// Deserializes the request body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl<B: Into<Bytes>> From<http::Request<B>> for Request {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        Request::new(parts, body.into())
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Parameters keep the order in which they are declared in the resource path.
/// An optional parameter the URL did not provide is present without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, Option<String>)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { params: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, name: String, value: Option<String>) {
        self.params.push((name, value));
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of declared path parameters, with or without a value
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    /// Returns None if the parameter doesn't exist or has no value
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).and_then(|(_, value)| value.as_deref())
    }

    /// Returns true if the parameter is declared by the matched path
    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        self.params.iter().any(|(name, _)| name == key)
    }

    /// Iterates over the parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}
