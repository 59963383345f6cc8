//! Response types: the raw transport result and the decoded wrapper.
//!
//! [`RawResponse`] is what a [`RequestAdapter`](crate::RequestAdapter) hands
//! back after one round trip, whatever the status. Classification into
//! success or [`Error::Api`] and decoding into a [`Response`] happen here.

use crate::{Error, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// A response exactly as the transport produced it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The response body.
    pub body: Bytes,

    /// Time from sending the request to receiving the full body.
    pub latency: Duration,
}

impl RawResponse {
    /// Reads the full body of a transport response.
    pub(crate) async fn read(response: reqwest::Response, started: Instant) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::transport)?;

        Ok(Self {
            status,
            headers,
            body,
            latency: started.elapsed(),
        })
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns `Err(Error::Api)` for any non-2xx status.
    ///
    /// # Examples
    ///
    /// ```
    /// use apisdk::{Error, RawResponse};
    /// use http::{HeaderMap, StatusCode};
    /// use std::time::Duration;
    ///
    /// let raw = RawResponse {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     headers: HeaderMap::new(),
    ///     body: "down for maintenance".into(),
    ///     latency: Duration::from_millis(3),
    /// };
    ///
    /// match raw.error_for_status() {
    ///     Err(Error::Api { status, raw_response, .. }) => {
    ///         assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    ///         assert_eq!(raw_response, "down for maintenance");
    ///     }
    ///     other => panic!("Expected Api error, got {:?}", other),
    /// }
    /// ```
    pub fn error_for_status(self) -> Result<Self> {
        let status = self.status;
        if status.is_success() {
            return Ok(self);
        }

        let raw_response = self.text();
        if status.is_client_error() {
            tracing::error!(
                status = status.as_u16(),
                response = %raw_response,
                "Client error (4xx)"
            );
        } else if status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                response = %raw_response,
                "Server error (5xx)"
            );
        }

        Err(Error::Api {
            status,
            raw_response,
            headers: self.headers,
        })
    }

    /// Decodes a JSON body.
    ///
    /// A `204 No Content` status or an empty body yields `data: None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<Response<Option<T>>> {
        let raw_body = self.text();

        if self.status == StatusCode::NO_CONTENT || raw_body.trim().is_empty() {
            return Ok(Response::new(None, raw_body, self.status, self.headers, self.latency));
        }

        match serde_json::from_str::<T>(&raw_body) {
            Ok(data) => Ok(Response::new(
                Some(data),
                raw_body,
                self.status,
                self.headers,
                self.latency,
            )),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %raw_body,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: raw_body,
                    serde_error: e.to_string(),
                    status: self.status,
                })
            }
        }
    }

    /// Discards the body.
    pub fn no_content(self) -> Response<()> {
        let raw_body = self.text();
        Response::new((), raw_body, self.status, self.headers, self.latency)
    }
}

/// A successful, decoded response together with its HTTP metadata.
///
/// # Type Parameters
///
/// * `T` - The type of the decoded response data
///
/// # Examples
///
/// ```
/// use apisdk::Response;
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// let response = Response::new(
///     42,
///     "42".to_string(),
///     StatusCode::OK,
///     HeaderMap::new(),
///     Duration::from_millis(100),
/// );
///
/// assert_eq!(*response, 42);
/// assert_eq!(response.status, StatusCode::OK);
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response data.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request to receiving the full body.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use apisdk::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Consumes the response, returning only the data.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use apisdk::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(
    ///     (),
    ///     String::new(),
    ///     StatusCode::OK,
    ///     headers,
    ///     Duration::from_millis(100),
    /// );
    ///
    /// assert_eq!(
    ///     response.header("content-type").unwrap(),
    ///     "application/json"
    /// );
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
