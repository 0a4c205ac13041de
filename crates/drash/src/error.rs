//! Error taxonomy of the request pipeline.
//!
//! There is a single failure type on the request path, [`HttpError`]. Conditions
//! detected by the framework itself (no matching resource, no handler for the
//! method) are expressed with the same type as failures raised by user code, so
//! every failure travels through one error handling path.

use crate::path::PathError;
use crate::status;
use http::{Method, StatusCode};
use thiserror::Error;

/// The result every method handler and lifecycle hook returns.
pub type HandlerResult = Result<(), HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
    /// No registered resource matched the request path.
    #[error("Not Found")]
    ResourceNotFound { path: String },

    /// A resource matched, but it has no handler for the request method.
    #[error("Not Implemented")]
    MethodNotImplemented { method: Method, path: String },

    /// A failure raised by a service hook or a resource method handler.
    #[error("{message}")]
    Application { code: Option<u16>, message: String },

    /// The error handler itself failed while handling `original_status`'s error.
    #[error("{source}")]
    HandlerFailure { source: Box<HttpError>, original_status: Option<StatusCode> },
}

impl HttpError {
    /// Creates an application error carrying a status code and a message.
    ///
    /// The code is kept as given; it is only honoured when the status registry
    /// recognizes it, otherwise the error resolves to 500.
    pub fn new<S: Into<String>>(code: u16, message: S) -> Self {
        Self::Application { code: Some(code), message: message.into() }
    }

    /// Creates an application error whose message is the canonical description of `code`.
    pub fn from_code(code: u16) -> Self {
        let message = status::description(code).unwrap_or("Internal Server Error");
        Self::new(code, message)
    }

    /// Creates an application error without a status code, it resolves to 500.
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::Application { code: None, message: message.into() }
    }

    /// The condition synthesized when error handling starts without an error.
    pub fn internal() -> Self {
        Self::from_code(500)
    }

    pub fn resource_not_found<S: Into<String>>(path: S) -> Self {
        Self::ResourceNotFound { path: path.into() }
    }

    pub fn method_not_implemented<S: Into<String>>(method: Method, path: S) -> Self {
        Self::MethodNotImplemented { method, path: path.into() }
    }

    pub(crate) fn handler_failure(secondary: HttpError, original: Option<&HttpError>) -> Self {
        Self::HandlerFailure {
            source: Box::new(secondary),
            original_status: original.and_then(HttpError::carried_status),
        }
    }

    /// The status this error carries, if the status registry recognizes it.
    pub fn carried_status(&self) -> Option<StatusCode> {
        match self {
            Self::ResourceNotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::MethodNotImplemented { .. } => Some(StatusCode::NOT_IMPLEMENTED),
            Self::Application { code, .. } => code.and_then(status::recognized),
            Self::HandlerFailure { source, original_status } => source.carried_status().or(*original_status),
        }
    }

    /// The effective response status of this error, 500 when none is carried.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.carried_status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns true if this error records a failure of the error handler itself.
    pub fn is_handler_failure(&self) -> bool {
        matches!(self, Self::HandlerFailure { .. })
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(400, format!("invalid json body: {e}"))
    }
}

impl From<serde_urlencoded::de::Error> for HttpError {
    fn from(e: serde_urlencoded::de::Error) -> Self {
        Self::new(400, format!("invalid query string: {e}"))
    }
}

/// Errors raised while assembling an [`Application`](crate::Application).
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("resource '{resource}' declares no paths")]
    MissingPaths { resource: String },

    #[error("resource '{resource}' has an invalid path: {source}")]
    InvalidPath {
        resource: String,
        #[source]
        source: PathError,
    },

    #[error("startup hook of service '{service}' failed: {source}")]
    Startup {
        service: String,
        #[source]
        source: HttpError,
    },
}
