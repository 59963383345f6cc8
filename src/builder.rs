//! The immutable path builder shared by every fluent accessor.
//!
//! A [`RequestBuilder`] is plain data plus a shared handle to the adapter.
//! Extending it (a literal segment, a keyed item, a raw URL, a
//! configuration) returns a new value and never performs I/O. Only the verb
//! methods of the typed builders in [`client`](crate::client) reach the
//! adapter.

use crate::{
    adapter::RequestAdapter,
    config::RequestConfiguration,
    request::{PathParameters, PathTemplate, RequestInformation},
    Result,
};
use http::Method;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Accumulated path, parameters and options for one call chain.
#[derive(Clone)]
pub struct RequestBuilder {
    adapter: Arc<dyn RequestAdapter>,
    url_template: PathTemplate,
    path_parameters: PathParameters,
    raw_url: Option<Url>,
    config: Option<Arc<RequestConfiguration>>,
}

impl RequestBuilder {
    /// Creates a builder pointing at the service root.
    pub fn new(adapter: Arc<dyn RequestAdapter>, path_parameters: PathParameters) -> Self {
        Self {
            adapter,
            url_template: PathTemplate::new(),
            path_parameters,
            raw_url: None,
            config: None,
        }
    }

    /// Returns a builder one fixed segment deeper.
    pub fn literal(&self, segment: &str) -> Self {
        self.descend(self.url_template.literal(segment), self.path_parameters.clone())
    }

    /// Returns a builder one parameterized segment deeper, with `name` bound
    /// to `value`.
    pub fn item(&self, name: &str, value: impl Into<String>) -> Self {
        let mut path_parameters = self.path_parameters.clone();
        path_parameters.insert(name.to_string(), value.into());
        self.descend(self.url_template.parameter(name), path_parameters)
    }

    fn descend(&self, url_template: PathTemplate, path_parameters: PathParameters) -> Self {
        Self {
            adapter: self.adapter.clone(),
            url_template,
            path_parameters,
            raw_url: None,
            config: None,
        }
    }

    /// Returns a copy targeting `raw_url` instead of the accumulated path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`](crate::Error::InvalidUrl) if `raw_url` is
    /// not an absolute URL.
    pub fn with_url(&self, raw_url: &str) -> Result<Self> {
        let mut builder = self.clone();
        builder.raw_url = Some(Url::parse(raw_url)?);
        Ok(builder)
    }

    /// Returns a copy whose requests are adjusted by `config`.
    ///
    /// The configuration applies to verbs invoked on the returned builder
    /// only; builders derived from it start without one.
    pub fn with_config(&self, config: RequestConfiguration) -> Self {
        let mut builder = self.clone();
        builder.config = Some(Arc::new(config));
        builder
    }

    /// The adapter that verb methods send through.
    pub fn adapter(&self) -> &Arc<dyn RequestAdapter> {
        &self.adapter
    }

    /// The accumulated path template, e.g. `{+baseurl}/foo/{foo_id}`.
    pub fn url_template(&self) -> &PathTemplate {
        &self.url_template
    }

    /// Values bound to the template's parameters, including `baseurl`.
    pub fn path_parameters(&self) -> &PathParameters {
        &self.path_parameters
    }

    /// Starts describing a request with the accumulated path.
    pub fn request_information(&self, method: Method) -> RequestInformation {
        match &self.raw_url {
            Some(url) => RequestInformation::for_url(method, url.clone()),
            None => RequestInformation::new(
                method,
                self.url_template.clone(),
                self.path_parameters.clone(),
            ),
        }
    }

    /// Applies this builder's configuration, if any, as the last step of
    /// describing a request.
    pub fn configured(&self, mut request: RequestInformation) -> RequestInformation {
        if let Some(config) = &self.config {
            request.configure(config);
        }
        request
    }

    /// The URL a request from this builder would target.
    pub fn url(&self) -> Result<Url> {
        self.request_information(Method::GET).url()
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("url_template", &self.url_template.to_string())
            .field("path_parameters", &self.path_parameters)
            .field("raw_url", &self.raw_url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Implemented by every typed builder, giving uniform access to where it points.
pub trait PathBuilder {
    /// The untyped builder this one wraps.
    fn request_builder(&self) -> &RequestBuilder;

    /// See [`RequestBuilder::url_template`].
    fn url_template(&self) -> &PathTemplate {
        self.request_builder().url_template()
    }

    /// See [`RequestBuilder::path_parameters`].
    fn path_parameters(&self) -> &PathParameters {
        self.request_builder().path_parameters()
    }

    /// The URL a verb on this builder would target. Performs no I/O.
    fn url(&self) -> Result<Url> {
        self.request_builder().url()
    }
}
