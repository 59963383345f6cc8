//! The client facade: typed builders mirroring the service's resource paths.
//!
//! ```text
//! ApiClient
//! ├── foo(foo_id)                      /foo/{foo_id}
//! │   └── bar(bar_id)                  /foo/{foo_id}/bar/{bar_id}          GET
//! ├── baz(baz_id)                      /baz/{baz_id}
//! └── api()                            /api
//!     └── model_registry()             /api/model_registry
//!         └── v1alpha3()               /api/model_registry/v1alpha3
//!             └── model_artifacts()    .../model_artifacts                 GET POST
//!                 └── by_modelartifact_id(id)  .../model_artifacts/{id}    GET PATCH DELETE
//! ```

mod baz;
mod foo;
mod model_registry;

pub use baz::BazItemRequestBuilder;
pub use foo::{BarItemRequestBuilder, FooItemRequestBuilder};
pub use model_registry::{
    ApiRequestBuilder, ModelArtifactItemRequestBuilder, ModelArtifactsRequestBuilder,
    ModelRegistryRequestBuilder, V1alpha3RequestBuilder,
};

use crate::{
    adapter::RequestAdapter,
    builder::{PathBuilder, RequestBuilder},
    request::{PathParameters, BASE_URL_KEY},
};
use std::sync::Arc;

/// Base URL used when the adapter does not configure one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Entry point of the fluent API.
///
/// Holds a shared handle to the adapter; cloning the client, or any builder
/// derived from it, never copies the adapter.
///
/// # Examples
///
/// ```no_run
/// use apisdk::{AnonymousAuthenticationProvider, ApiClient, HttpRequestAdapter};
///
/// # async fn example() -> Result<(), apisdk::Error> {
/// let adapter = HttpRequestAdapter::new(AnonymousAuthenticationProvider)?;
/// let client = ApiClient::new(adapter);
///
/// let bar = client.foo("x").bar("y").get().await?;
/// println!("{:?}", bar);
///
/// // Builders perform no I/O until a verb is called.
/// let _baz = client.baz("x");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: RequestBuilder,
}

impl ApiClient {
    /// Creates a client over `adapter`.
    ///
    /// The adapter's base URL is used when present, otherwise
    /// [`DEFAULT_BASE_URL`].
    pub fn new(adapter: impl RequestAdapter + 'static) -> Self {
        Self::from_shared(Arc::new(adapter))
    }

    /// Creates a client over an adapter that is shared with other clients.
    pub fn from_shared(adapter: Arc<dyn RequestAdapter>) -> Self {
        let base_url = adapter
            .base_url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut path_parameters = PathParameters::new();
        path_parameters.insert(BASE_URL_KEY.to_string(), base_url);

        Self {
            inner: RequestBuilder::new(adapter, path_parameters),
        }
    }

    /// Selects the `foo` item with the given key.
    pub fn foo(&self, foo_id: impl Into<String>) -> FooItemRequestBuilder {
        FooItemRequestBuilder::new(self.inner.literal("foo").item("foo_id", foo_id))
    }

    /// Selects the `baz` item with the given key.
    pub fn baz(&self, baz_id: impl Into<String>) -> BazItemRequestBuilder {
        BazItemRequestBuilder::new(self.inner.literal("baz").item("baz_id", baz_id))
    }

    /// Enters the `/api` subtree.
    pub fn api(&self) -> ApiRequestBuilder {
        ApiRequestBuilder::new(self.inner.literal("api"))
    }
}

impl PathBuilder for ApiClient {
    fn request_builder(&self) -> &RequestBuilder {
        &self.inner
    }
}
