//! Error types for jpdex.
//!
//! All errors are strongly typed using thiserror. Cancellation and timeout
//! are distinct variants so callers match on them structurally instead of
//! inspecting an error's name or message.

use std::time::Duration;

use thiserror::Error;

/// Errors from the upstream HTTP API.
///
/// The resolver recovers from every one of these by falling back to the
/// original identifier; they surface directly only from the plain client
/// methods ([`crate::PokeApiClient::pokemon`] and friends).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response body could not be read
    /// or decoded.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {status} for '{resource}'")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// The resource path that was requested.
        resource: String,
    },
}

impl ApiError {
    /// Whether this error is the upstream's way of saying the resource does
    /// not exist (as opposed to a transient failure).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

/// Outcomes of a name resolution that did not produce a value.
///
/// Both variants mean "nothing was cached, retry later". Fallback results are
/// not errors: a lookup that fails or lacks the target locale resolves to the
/// original identifier instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The caller-supplied cancellation token fired before the lookup
    /// settled.
    #[error("name lookup cancelled")]
    Cancelled,

    /// The internal per-lookup timeout fired before the upstream answered.
    #[error("name lookup timed out after {0:?}")]
    TimedOut(Duration),
}
