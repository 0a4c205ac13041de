//! Turning failures into responses.
//!
//! The [`ErrorHandlerProxy`] wraps the application's [`ErrorHandler`]. If that
//! handler fails in turn, its failure becomes the context error and the
//! [`DefaultErrorHandler`] writes the response instead, which cannot fail.

use crate::context::RequestContext;
use crate::error::{HandlerResult, HttpError};
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Writes a status and body for `error` onto `response`.
    async fn handle(&self, error: &HttpError, request: &Request, response: &mut Response) -> HandlerResult;
}

#[async_trait]
impl<T: ErrorHandler + ?Sized> ErrorHandler for Arc<T> {
    async fn handle(&self, error: &HttpError, request: &Request, response: &mut Response) -> HandlerResult {
        (**self).handle(error, request, response).await
    }
}

/// Writes the error's status and its message as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl DefaultErrorHandler {
    pub fn write(error: &HttpError, response: &mut Response) {
        response.set_status(error.status()).text(error.to_string());
    }
}

#[async_trait]
impl ErrorHandler for DefaultErrorHandler {
    async fn handle(&self, error: &HttpError, _request: &Request, response: &mut Response) -> HandlerResult {
        Self::write(error, response);
        Ok(())
    }
}

#[derive(Clone)]
pub struct ErrorHandlerProxy {
    handler: Arc<dyn ErrorHandler>,
}

impl ErrorHandlerProxy {
    pub fn new(handler: Arc<dyn ErrorHandler>) -> Self {
        Self { handler }
    }

    /// Handles the context error, synthesizing a 500 when none is set.
    pub async fn handle(&self, ctx: &mut RequestContext) {
        let (error, request, response) = ctx.error_parts();
        let Err(secondary) = self.handler.handle(error, request, response).await else {
            return;
        };

        error!(cause = %secondary, original = %error, "error handler failed, falling back to the default handler");
        let original = ctx.take_error();
        ctx.set_error(HttpError::handler_failure(secondary, original.as_ref()));

        let (error, _, response) = ctx.error_parts();
        DefaultErrorHandler::write(error, response);
    }
}

impl Default for ErrorHandlerProxy {
    fn default() -> Self {
        Self::new(Arc::new(DefaultErrorHandler))
    }
}

impl std::fmt::Debug for ErrorHandlerProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandlerProxy").finish_non_exhaustive()
    }
}
