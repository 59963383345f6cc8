use crate::{
    builder::{PathBuilder, RequestBuilder},
    Result,
};

/// `/baz/{baz_id}`
///
/// The service exposes no operations at this path yet, so this builder has
/// no verbs. It can still be constructed and inspected.
#[derive(Debug, Clone)]
pub struct BazItemRequestBuilder {
    inner: RequestBuilder,
}

impl BazItemRequestBuilder {
    pub(crate) fn new(inner: RequestBuilder) -> Self {
        Self { inner }
    }

    /// Returns a builder with the provided arbitrary URL. Path parameters of
    /// this builder are then ignored.
    pub fn with_url(&self, raw_url: &str) -> Result<Self> {
        Ok(Self::new(self.inner.with_url(raw_url)?))
    }
}

impl PathBuilder for BazItemRequestBuilder {
    fn request_builder(&self) -> &RequestBuilder {
        &self.inner
    }
}
