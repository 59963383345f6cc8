//! Error types for requests issued through a [`RequestAdapter`](crate::RequestAdapter).
//!
//! Errors fall into four groups: transport failures (the request never produced
//! a response), API failures (a well-formed response with a non-2xx status),
//! parse failures (the body did not match the expected shape) and request
//! assembly failures (the request could not be described in the first place).
//! Raw response data is preserved wherever a response was received.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// The main error type for requests sent through the adapter.
///
/// # Examples
///
/// ```no_run
/// use apisdk::{AnonymousAuthenticationProvider, ApiClient, Error, HttpRequestAdapter};
///
/// # async fn example() -> Result<(), Error> {
/// let adapter = HttpRequestAdapter::builder()
///     .auth(AnonymousAuthenticationProvider)
///     .base_url("https://api.example.com")?
///     .build()?;
/// let client = ApiClient::new(adapter);
///
/// match client.foo("x").bar("y").get().await {
///     Ok(bar) => println!("Bar: {:?}", bar),
///     Err(Error::Api { status, raw_response, .. }) => {
///         eprintln!("API error {}: {}", status, raw_response);
///     }
///     Err(e) if e.is_transport() => eprintln!("Could not reach the service: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, DNS lookup failed, etc.).
    ///
    /// No response was received from the server.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request timed out before a response was received.
    #[error("Request timed out")]
    Timeout,

    /// The server returned a non-2xx HTTP status code.
    #[error("API error {status}: {raw_response}")]
    Api {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// Failed to deserialize the response body into the expected type.
    ///
    /// Both the raw body and the serde message are kept so that schema drift
    /// can be diagnosed from logs alone.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to serialize the request body or query parameters.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The URL template references a path parameter that was never supplied.
    #[error("Missing path parameter: {0}")]
    MissingPathParameter(String),

    /// A path parameter value would be dropped or reinterpreted as a relative
    /// path segment (`.` or `..`).
    #[error("Invalid value {value:?} for path parameter {name}")]
    InvalidPathParameter {
        /// The parameter name in the URL template
        name: String,
        /// The rejected value
        value: String,
    },

    /// An invalid URL was provided or assembled.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided, such as an invalid header value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The authentication provider refused to decorate the request.
    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl Error {
    /// Classifies a transport failure, separating timeouts from other network errors.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }

    /// Returns `true` if no response was received at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use apisdk::Error;
    /// use http::StatusCode;
    ///
    /// assert!(Error::Timeout.is_transport());
    ///
    /// let err = Error::Api {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     raw_response: String::new(),
    ///     headers: http::HeaderMap::new(),
    /// };
    /// assert!(!err.is_transport());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout)
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if a response was received.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Decodes the body of an [`Error::Api`] into a typed error payload.
    ///
    /// Returns `None` for other variants or when the body does not match `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use apisdk::{models::ErrorBody, Error};
    /// use http::StatusCode;
    ///
    /// let err = Error::Api {
    ///     status: StatusCode::NOT_FOUND,
    ///     raw_response: r#"{"code":"not-found","message":"no such artifact"}"#.to_string(),
    ///     headers: http::HeaderMap::new(),
    /// };
    ///
    /// let body: ErrorBody = err.error_body().unwrap();
    /// assert_eq!(body.code, "not-found");
    /// ```
    pub fn error_body<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            Error::Api { raw_response, .. } => serde_json::from_str(raw_response).ok(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for adapter and builder operations.
pub type Result<T> = std::result::Result<T, Error>;
