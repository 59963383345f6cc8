//! The request adapter: turns a [`RequestInformation`] into one network call.
//!
//! [`RequestAdapter`] is the seam the fluent builders talk to. The
//! reqwest-backed [`HttpRequestAdapter`] is the production implementation;
//! configure it with [`HttpRequestAdapterBuilder`].

use crate::{
    auth::{AnonymousAuthenticationProvider, AuthenticationProvider},
    request::{RequestInformation, BASE_URL_KEY},
    transport::HttpTransport,
    Error, RawResponse, Response, Result,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Sends fully-described requests.
///
/// Implementations authenticate the request, perform exactly one round trip
/// and return whatever the server answered. Status classification and
/// decoding are done by the typed helpers on `dyn RequestAdapter`:
/// `send`, `send_no_content` and `send_bytes`.
#[async_trait]
pub trait RequestAdapter: Send + Sync {
    /// The service root used when a request does not carry its own.
    fn base_url(&self) -> Option<&Url>;

    /// Authenticates and sends `request`, returning the response for any status.
    ///
    /// # Errors
    ///
    /// Returns transport errors ([`Error::Network`], [`Error::Timeout`]),
    /// authentication errors, and request assembly errors. Never returns
    /// [`Error::Api`].
    async fn execute(&self, request: RequestInformation) -> Result<RawResponse>;
}

impl dyn RequestAdapter {
    /// Sends `request` and decodes a JSON body into `T`.
    ///
    /// `data` is `None` for `204 No Content` and empty bodies.
    ///
    /// # Errors
    ///
    /// Transport and assembly errors from [`execute`](RequestAdapter::execute),
    /// [`Error::Api`] for non-2xx statuses and [`Error::DeserializationFailed`]
    /// for bodies that do not match `T`.
    pub async fn send<T>(&self, request: RequestInformation) -> Result<Response<Option<T>>>
    where
        T: DeserializeOwned,
    {
        self.execute(request).await?.error_for_status()?.json()
    }

    /// Sends `request` and ignores the response body.
    pub async fn send_no_content(&self, request: RequestInformation) -> Result<Response<()>> {
        Ok(self.execute(request).await?.error_for_status()?.no_content())
    }

    /// Sends `request` and returns the undecoded body.
    pub async fn send_bytes(&self, request: RequestInformation) -> Result<Response<Bytes>> {
        let raw = self.execute(request).await?.error_for_status()?;
        let raw_body = raw.text();
        Ok(Response::new(raw.body, raw_body, raw.status, raw.headers, raw.latency))
    }
}

/// A [`RequestAdapter`] backed by `reqwest`.
///
/// Cloning is cheap and clones share the connection pool, the authentication
/// provider and the configuration, none of which change after construction.
///
/// # Examples
///
/// ```no_run
/// use apisdk::{AnonymousAuthenticationProvider, ApiClient, HttpRequestAdapter};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), apisdk::Error> {
/// let adapter = HttpRequestAdapter::builder()
///     .auth(AnonymousAuthenticationProvider)
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
///
/// let client = ApiClient::new(adapter);
/// let bar = client.foo("x").bar("y").get().await?;
/// println!("Bar: {:?}", bar);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpRequestAdapter {
    inner: Arc<AdapterInner>,
}

struct AdapterInner {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthenticationProvider>,
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpRequestAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequestAdapter")
            .field("base_url", &self.inner.base_url)
            .field("default_headers", &self.inner.default_headers)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpRequestAdapter {
    /// Creates an adapter with the given authentication provider and defaults
    /// for everything else. The base URL is left to the client facade.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(auth: impl AuthenticationProvider + 'static) -> Result<Self> {
        Self::builder().auth(auth).build()
    }

    /// Creates a new `HttpRequestAdapterBuilder`.
    pub fn builder() -> HttpRequestAdapterBuilder {
        HttpRequestAdapterBuilder::new()
    }

    /// Turns the request description into a transport request.
    fn build_request(&self, request: &RequestInformation, url: Url) -> reqwest::Request {
        let mut outgoing = reqwest::Request::new(request.method.clone(), url);

        let headers = outgoing.headers_mut();
        for (name, value) in &self.inner.default_headers {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        *outgoing.timeout_mut() = request.timeout.or(self.inner.timeout);

        if let Some(content) = &request.content {
            *outgoing.body_mut() = Some(reqwest::Body::from(content.clone()));
        }

        outgoing
    }
}

#[async_trait]
impl RequestAdapter for HttpRequestAdapter {
    fn base_url(&self) -> Option<&Url> {
        self.inner.base_url.as_ref()
    }

    async fn execute(&self, mut request: RequestInformation) -> Result<RawResponse> {
        if !request.has_base_url() {
            if let Some(base_url) = &self.inner.base_url {
                request
                    .path_parameters
                    .insert(BASE_URL_KEY.to_string(), base_url.to_string());
            }
        }

        self.inner.auth.authenticate_request(&mut request).await?;

        let url = request.url()?;
        tracing::debug!(
            method = %request.method,
            url = %url,
            template = %request.url_template,
            "Executing HTTP request"
        );

        let outgoing = self.build_request(&request, url);
        let start_time = Instant::now();
        let response = match self.inner.transport.execute(outgoing).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    method = %request.method,
                    "Request failed before a response was received"
                );
                return Err(Error::transport(e));
            }
        };

        let raw = RawResponse::read(response, start_time).await?;
        tracing::info!(
            status = raw.status.as_u16(),
            latency_ms = raw.latency.as_millis(),
            "Received HTTP response"
        );
        Ok(raw)
    }
}

/// Builder for configuring and creating an [`HttpRequestAdapter`].
///
/// Defaults: anonymous authentication, no base URL, no timeout, and a plain
/// `reqwest::Client` as transport.
pub struct HttpRequestAdapterBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Arc<dyn AuthenticationProvider>,
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl HttpRequestAdapterBuilder {
    /// Creates a new `HttpRequestAdapterBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            transport: None,
            auth: Arc::new(AnonymousAuthenticationProvider),
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the authentication provider.
    pub fn auth(mut self, auth: impl AuthenticationProvider + 'static) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    /// Sets a provider that is also shared with other adapters.
    pub fn shared_auth(mut self, auth: Arc<dyn AuthenticationProvider>) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the base URL for requests that do not carry their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// Headers set on an individual request take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the transport, e.g. with a preconfigured `reqwest::Client` or
    /// an instrumented wrapper.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the configured `HttpRequestAdapter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP client cannot be built.
    pub fn build(self) -> Result<HttpRequestAdapter> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let client = reqwest::Client::builder().build().map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(client)
            }
        };

        Ok(HttpRequestAdapter {
            inner: Arc::new(AdapterInner {
                transport,
                auth: self.auth,
                base_url: self.base_url,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for HttpRequestAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{PathParameters, PathTemplate};
    use http::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Counts authentications and tags each request with the running count.
    #[derive(Default)]
    struct CountingAuth {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthenticationProvider for CountingAuth {
        async fn authenticate_request(&self, request: &mut RequestInformation) -> Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            request
                .headers
                .insert("x-auth-call", HeaderValue::from(n as u64));
            Ok(())
        }
    }

    fn get(url: &str) -> RequestInformation {
        RequestInformation::for_url(Method::GET, Url::parse(url).unwrap())
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpRequestAdapter::builder().base_url("not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_default_header() {
        let result = HttpRequestAdapter::builder().default_header("bad header", "v");
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_request_headers_override_defaults() {
        let adapter = HttpRequestAdapter::builder()
            .default_header("accept", "text/plain")
            .unwrap()
            .default_header("user-agent", "apisdk-test")
            .unwrap()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        let mut request =
            RequestInformation::new(Method::POST, PathTemplate::new(), PathParameters::new());
        request
            .headers
            .insert("accept", HeaderValue::from_static("application/json"));
        request.content = Some(Bytes::from_static(b"{}"));
        request.timeout = Some(Duration::from_secs(2));

        let url = Url::parse("https://api.example.com/foo").unwrap();
        let outgoing = adapter.build_request(&request, url);

        assert_eq!(outgoing.method(), &Method::POST);
        assert_eq!(outgoing.headers().get("accept").unwrap(), "application/json");
        assert_eq!(outgoing.headers().get("user-agent").unwrap(), "apisdk-test");
        assert_eq!(outgoing.timeout(), Some(&Duration::from_secs(2)));
        assert!(outgoing.body().is_some());
    }

    #[tokio::test]
    async fn test_missing_base_url_fails_before_sending() {
        let adapter = HttpRequestAdapter::new(AnonymousAuthenticationProvider).unwrap();
        let request = RequestInformation::new(
            Method::GET,
            PathTemplate::new().literal("foo"),
            PathParameters::new(),
        );

        let err = adapter.execute(request).await.unwrap_err();
        assert!(matches!(err, Error::MissingPathParameter(ref name) if name == BASE_URL_KEY));
    }

    #[tokio::test]
    async fn test_send_bytes_returns_undecoded_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(&b"\x00raw\xffbytes"[..])
                    .insert_header("content-type", "application/octet-stream"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter: Arc<dyn RequestAdapter> =
            Arc::new(HttpRequestAdapter::builder().build().unwrap());
        let response = adapter
            .send_bytes(get(&format!("{}/blob", mock_server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.data[..], &b"\x00raw\xffbytes"[..]);
        assert_eq!(
            response.header("content-type").unwrap(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_send_bytes_classifies_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such blob"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let adapter: Arc<dyn RequestAdapter> =
            Arc::new(HttpRequestAdapter::builder().build().unwrap());
        let err = adapter
            .send_bytes(get(&format!("{}/blob", mock_server.uri())))
            .await
            .unwrap_err();

        match err {
            Error::Api {
                status,
                raw_response,
                ..
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(raw_response, "no such blob");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shared_auth_is_used_by_every_adapter() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/first"))
            .and(header("x-auth-call", "1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/second"))
            .and(header("x-auth-call", "2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let auth = Arc::new(CountingAuth::default());
        let first = HttpRequestAdapter::builder()
            .shared_auth(auth.clone())
            .build()
            .unwrap();
        let second = HttpRequestAdapter::builder()
            .shared_auth(auth.clone())
            .build()
            .unwrap();

        let raw = first
            .execute(get(&format!("{}/first", mock_server.uri())))
            .await
            .unwrap();
        assert_eq!(raw.status, StatusCode::NO_CONTENT);
        let raw = second
            .execute(get(&format!("{}/second", mock_server.uri())))
            .await
            .unwrap();
        assert_eq!(raw.status, StatusCode::NO_CONTENT);

        assert_eq!(auth.calls.load(Ordering::SeqCst), 2);
    }
}
