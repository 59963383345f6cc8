//! Builders under `/api/model_registry/v1alpha3`.

use crate::{
    builder::{PathBuilder, RequestBuilder},
    config::RequestConfiguration,
    models::{
        ModelArtifact, ModelArtifactCreate, ModelArtifactList, ModelArtifactUpdate,
        ModelArtifactsQuery,
    },
    request::RequestInformation,
    Result,
};
use http::{header::ACCEPT, Method};

const JSON: &str = "application/json";

macro_rules! impl_path_builder {
    ($($builder:ident),+ $(,)?) => {
        $(
            impl PathBuilder for $builder {
                fn request_builder(&self) -> &RequestBuilder {
                    &self.inner
                }
            }
        )+
    };
}

impl_path_builder!(
    ApiRequestBuilder,
    ModelRegistryRequestBuilder,
    V1alpha3RequestBuilder,
    ModelArtifactsRequestBuilder,
    ModelArtifactItemRequestBuilder,
);

/// `/api`
#[derive(Debug, Clone)]
pub struct ApiRequestBuilder {
    inner: RequestBuilder,
}

impl ApiRequestBuilder {
    pub(crate) fn new(inner: RequestBuilder) -> Self {
        Self { inner }
    }

    /// `/api/model_registry`
    pub fn model_registry(&self) -> ModelRegistryRequestBuilder {
        ModelRegistryRequestBuilder {
            inner: self.inner.literal("model_registry"),
        }
    }
}

/// `/api/model_registry`
#[derive(Debug, Clone)]
pub struct ModelRegistryRequestBuilder {
    inner: RequestBuilder,
}

impl ModelRegistryRequestBuilder {
    /// API version `v1alpha3`.
    pub fn v1alpha3(&self) -> V1alpha3RequestBuilder {
        V1alpha3RequestBuilder {
            inner: self.inner.literal("v1alpha3"),
        }
    }
}

/// `/api/model_registry/v1alpha3`
#[derive(Debug, Clone)]
pub struct V1alpha3RequestBuilder {
    inner: RequestBuilder,
}

impl V1alpha3RequestBuilder {
    /// Path used to manage the list of model artifacts.
    pub fn model_artifacts(&self) -> ModelArtifactsRequestBuilder {
        ModelArtifactsRequestBuilder {
            inner: self.inner.literal("model_artifacts"),
        }
    }
}

/// `/api/model_registry/v1alpha3/model_artifacts`
#[derive(Debug, Clone)]
pub struct ModelArtifactsRequestBuilder {
    inner: RequestBuilder,
}

impl ModelArtifactsRequestBuilder {
    /// Path used to manage a single model artifact.
    pub fn by_modelartifact_id(
        &self,
        modelartifact_id: impl Into<String>,
    ) -> ModelArtifactItemRequestBuilder {
        ModelArtifactItemRequestBuilder {
            inner: self.inner.item("modelartifactId", modelartifact_id),
        }
    }

    /// Lists model artifacts, one page at a time.
    pub async fn get(&self, query: &ModelArtifactsQuery) -> Result<Option<ModelArtifactList>> {
        let request = self.to_get_request_information(query)?;
        Ok(self
            .inner
            .adapter()
            .send::<ModelArtifactList>(request)
            .await?
            .into_data())
    }

    /// Describes the list request without sending it.
    pub fn to_get_request_information(
        &self,
        query: &ModelArtifactsQuery,
    ) -> Result<RequestInformation> {
        let mut request = self.inner.request_information(Method::GET);
        request.set_query_parameters(query)?;
        request.try_add_header(ACCEPT, JSON)?;
        Ok(self.inner.configured(request))
    }

    /// Creates a model artifact.
    pub async fn post(&self, body: &ModelArtifactCreate) -> Result<Option<ModelArtifact>> {
        let request = self.to_post_request_information(body)?;
        Ok(self
            .inner
            .adapter()
            .send::<ModelArtifact>(request)
            .await?
            .into_data())
    }

    /// Describes the create request without sending it.
    pub fn to_post_request_information(
        &self,
        body: &ModelArtifactCreate,
    ) -> Result<RequestInformation> {
        let mut request = self.inner.request_information(Method::POST);
        request.try_add_header(ACCEPT, JSON)?;
        request.set_json_content(body)?;
        Ok(self.inner.configured(request))
    }

    /// Returns a builder whose requests carry `config`.
    pub fn with_config(&self, config: RequestConfiguration) -> Self {
        Self {
            inner: self.inner.with_config(config),
        }
    }

    /// Returns a builder with the provided arbitrary URL, such as a next-page
    /// link. Path parameters are then ignored.
    pub fn with_url(&self, raw_url: &str) -> Result<Self> {
        Ok(Self {
            inner: self.inner.with_url(raw_url)?,
        })
    }
}

/// `/api/model_registry/v1alpha3/model_artifacts/{modelartifactId}`
#[derive(Debug, Clone)]
pub struct ModelArtifactItemRequestBuilder {
    inner: RequestBuilder,
}

impl ModelArtifactItemRequestBuilder {
    /// Fetches a model artifact.
    pub async fn get(&self) -> Result<Option<ModelArtifact>> {
        let request = self.to_get_request_information()?;
        Ok(self
            .inner
            .adapter()
            .send::<ModelArtifact>(request)
            .await?
            .into_data())
    }

    /// Describes the fetch request without sending it.
    pub fn to_get_request_information(&self) -> Result<RequestInformation> {
        let mut request = self.inner.request_information(Method::GET);
        request.try_add_header(ACCEPT, JSON)?;
        Ok(self.inner.configured(request))
    }

    /// Updates an existing model artifact. Unset fields are left unchanged.
    pub async fn patch(&self, body: &ModelArtifactUpdate) -> Result<Option<ModelArtifact>> {
        let request = self.to_patch_request_information(body)?;
        Ok(self
            .inner
            .adapter()
            .send::<ModelArtifact>(request)
            .await?
            .into_data())
    }

    /// Describes the update request without sending it.
    pub fn to_patch_request_information(
        &self,
        body: &ModelArtifactUpdate,
    ) -> Result<RequestInformation> {
        let mut request = self.inner.request_information(Method::PATCH);
        request.try_add_header(ACCEPT, JSON)?;
        request.set_json_content(body)?;
        Ok(self.inner.configured(request))
    }

    /// Deletes a model artifact.
    pub async fn delete(&self) -> Result<()> {
        let request = self.to_delete_request_information()?;
        self.inner.adapter().send_no_content(request).await?;
        Ok(())
    }

    /// Describes the delete request without sending it.
    pub fn to_delete_request_information(&self) -> Result<RequestInformation> {
        let request = self.inner.request_information(Method::DELETE);
        Ok(self.inner.configured(request))
    }

    /// Returns a builder whose requests carry `config`.
    pub fn with_config(&self, config: RequestConfiguration) -> Self {
        Self {
            inner: self.inner.with_config(config),
        }
    }

    /// Returns a builder with the provided arbitrary URL.
    pub fn with_url(&self, raw_url: &str) -> Result<Self> {
        Ok(Self {
            inner: self.inner.with_url(raw_url)?,
        })
    }
}
