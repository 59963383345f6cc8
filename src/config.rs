//! Per-request configuration applied on top of what a verb method sets.

use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Extra headers, query parameters and a timeout override for a single call.
///
/// Headers set here replace headers of the same name chosen by the verb
/// method (for example `Accept`). Query parameters are appended after the
/// typed query parameters of the operation.
///
/// # Examples
///
/// ```
/// use apisdk::config::RequestConfiguration;
/// use std::time::Duration;
///
/// let config = RequestConfiguration::new()
///     .with_header("x-request-id", "abc-123")
///     .unwrap()
///     .with_query_param("debug", "true")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.query_parameters.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestConfiguration {
    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Additional query parameters, in insertion order.
    pub query_parameters: Vec<(String, String)>,

    /// Overrides the adapter's timeout for this request.
    pub timeout: Option<Duration>,
}

impl RequestConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_parameters.extend(params);
        self
    }

    /// Sets the timeout for this request only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
