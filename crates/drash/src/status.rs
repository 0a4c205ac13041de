//! HTTP status registry.
//!
//! The registry is the closed table of IANA registered status codes that
//! [`http::StatusCode`] carries a canonical reason phrase for. A numeric code is
//! *recognized* only when it appears in that table, which is what error
//! translation uses to decide whether an attached code can be honoured.

use http::StatusCode;

/// Returns the [`StatusCode`] for `code` if it is a registered status code.
///
/// # Example
/// ```
/// use drash::status;
/// use http::StatusCode;
///
/// assert_eq!(status::recognized(401), Some(StatusCode::UNAUTHORIZED));
/// assert_eq!(status::recognized(299), None);
/// assert_eq!(status::recognized(42), None);
/// ```
#[inline]
pub fn recognized(code: u16) -> Option<StatusCode> {
    StatusCode::from_u16(code).ok().filter(|status| status.canonical_reason().is_some())
}

/// Returns the canonical short description of a registered status code.
#[inline]
pub fn description(code: u16) -> Option<&'static str> {
    recognized(code).and_then(|status| status.canonical_reason())
}
