//! The pluggable HTTP transport underneath the request adapter.

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a fully-built HTTP request.
///
/// [`reqwest::Client`] is the default implementation. Wrap it to add
/// middleware, or to observe traffic in tests:
///
/// ```
/// use apisdk::HttpTransport;
/// use async_trait::async_trait;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Counting {
///     inner: reqwest::Client,
///     calls: AtomicUsize,
/// }
///
/// #[async_trait]
/// impl HttpTransport for Counting {
///     async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
///         self.calls.fetch_add(1, Ordering::SeqCst);
///         self.inner.execute(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns the response headers and body stream.
    async fn execute(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        reqwest::Client::execute(self, request).await
    }
}
