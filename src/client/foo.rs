use crate::{
    builder::{PathBuilder, RequestBuilder},
    config::RequestConfiguration,
    models::Bar,
    request::RequestInformation,
    Result,
};
use http::{header::ACCEPT, Method};

/// `/foo/{foo_id}`
#[derive(Debug, Clone)]
pub struct FooItemRequestBuilder {
    inner: RequestBuilder,
}

impl FooItemRequestBuilder {
    pub(crate) fn new(inner: RequestBuilder) -> Self {
        Self { inner }
    }

    /// Selects the `bar` item with the given key below this `foo`.
    pub fn bar(&self, bar_id: impl Into<String>) -> BarItemRequestBuilder {
        BarItemRequestBuilder::new(self.inner.literal("bar").item("bar_id", bar_id))
    }

    /// Returns a builder with the provided arbitrary URL. Path parameters of
    /// this builder are then ignored.
    pub fn with_url(&self, raw_url: &str) -> Result<Self> {
        Ok(Self::new(self.inner.with_url(raw_url)?))
    }
}

impl PathBuilder for FooItemRequestBuilder {
    fn request_builder(&self) -> &RequestBuilder {
        &self.inner
    }
}

/// `/foo/{foo_id}/bar/{bar_id}`
#[derive(Debug, Clone)]
pub struct BarItemRequestBuilder {
    inner: RequestBuilder,
}

impl BarItemRequestBuilder {
    pub(crate) fn new(inner: RequestBuilder) -> Self {
        Self { inner }
    }

    /// Fetches the `bar` item.
    ///
    /// Returns `None` when the service answers without a body.
    pub async fn get(&self) -> Result<Option<Bar>> {
        let request = self.to_get_request_information()?;
        Ok(self.inner.adapter().send::<Bar>(request).await?.into_data())
    }

    /// Describes the request [`get`](Self::get) would send.
    pub fn to_get_request_information(&self) -> Result<RequestInformation> {
        let mut request = self.inner.request_information(Method::GET);
        request.try_add_header(ACCEPT, "application/json")?;
        Ok(self.inner.configured(request))
    }

    /// Returns a builder whose requests carry `config`.
    pub fn with_config(&self, config: RequestConfiguration) -> Self {
        Self::new(self.inner.with_config(config))
    }

    /// Returns a builder with the provided arbitrary URL. Path parameters of
    /// this builder are then ignored.
    pub fn with_url(&self, raw_url: &str) -> Result<Self> {
        Ok(Self::new(self.inner.with_url(raw_url)?))
    }
}

impl PathBuilder for BarItemRequestBuilder {
    fn request_builder(&self) -> &RequestBuilder {
        &self.inner
    }
}
