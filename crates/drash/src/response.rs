//! The response builder every handler and hook writes into.
//!
//! A [`Response`] is a mutable accumulator owned by the request context. Services
//! and resource handlers set its status, headers and body while the lifecycle
//! runs; once the lifecycle is over the dispatcher finalizes it with
//! [`Response::into_http`] and nothing can change it anymore.

use crate::body::ResponseBody;
use crate::error::HttpError;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates an empty `200 OK` response.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets the status from a numeric code.
    ///
    /// Fails with a 500 application error when the code is not a valid status code.
    pub fn set_status_code(&mut self, code: u16) -> Result<&mut Self, HttpError> {
        let status = StatusCode::from_u16(code).map_err(|e| HttpError::message(format!("invalid status code {code}: {e}")))?;
        Ok(self.set_status(status))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the value of a header, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header<K, V>(&mut self, name: K, value: V) -> Result<&mut Self, HttpError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let name = HeaderName::try_from(name).map_err(|e| invalid_header(e.into()))?;
        let value = HeaderValue::try_from(value).map_err(|e| invalid_header(e.into()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replaces the body, leaving the headers untouched.
    pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Writes a `text/plain` body.
    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.typed_body(mime::TEXT_PLAIN_UTF_8.as_ref(), text.into())
    }

    /// Writes a `text/html` body.
    pub fn html(&mut self, html: impl Into<String>) -> &mut Self {
        self.typed_body(mime::TEXT_HTML_UTF_8.as_ref(), html.into())
    }

    /// Writes an `application/json` body.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self, HttpError> {
        let bytes = serde_json::to_vec(value).map_err(|e| HttpError::message(format!("failed to serialize json: {e}")))?;
        Ok(self.typed_body(mime::APPLICATION_JSON.as_ref(), bytes))
    }

    /// Turns the response into a redirect to `location`, `302 Found` by default.
    pub fn redirect(&mut self, location: &str, status: Option<StatusCode>) -> Result<&mut Self, HttpError> {
        self.set_header(LOCATION, location)?;
        Ok(self.set_status(status.unwrap_or(StatusCode::FOUND)))
    }

    fn typed_body(&mut self, content_type: &'static str, body: impl Into<Bytes>) -> &mut Self {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.set_body(body)
    }

    /// Finalizes the builder into the response handed to the transport adapter.
    pub fn into_http(self) -> http::Response<ResponseBody> {
        let mut response = http::Response::new(ResponseBody::once(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

fn invalid_header(e: http::Error) -> HttpError {
    HttpError::message(format!("invalid header: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_response() {
        let response = Response::new();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_text_body() {
        let mut response = Response::new();
        response.set_status(StatusCode::CREATED).text("brewed");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.body().as_ref(), b"brewed");
    }

    #[test]
    fn test_html_body() {
        let mut response = Response::new();
        response.html("<h1>Coffee</h1>");
        assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_json_body() {
        let mut response = Response::new();
        response.json(&json!({"id": 17})).unwrap();

        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.body().as_ref(), br#"{"id":17}"#);
    }

    #[test]
    fn test_headers() {
        let mut response = Response::new();
        response.set_header("x-powered-by", "drash").unwrap();
        assert_eq!(response.header("x-powered-by"), Some("drash"));

        assert!(response.set_header("bad header", "value").is_err());
        assert!(response.set_header("x-ok", "bad\nvalue").is_err());
    }

    #[test]
    fn test_status_code() {
        let mut response = Response::new();
        response.set_status_code(418).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert!(response.set_status_code(42).is_err());
    }

    #[test]
    fn test_redirect() {
        let mut response = Response::new();
        response.redirect("/login", None).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/login"));
    }

    #[test]
    fn test_into_http() {
        let mut response = Response::new();
        response.set_status(StatusCode::ACCEPTED).text("queued");

        let http_response = response.into_http();
        assert_eq!(http_response.status(), StatusCode::ACCEPTED);
        assert_eq!(http_response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(http_response.body().as_bytes(), b"queued");
    }
}
