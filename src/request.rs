//! Fully-described requests and the path templates they are built from.
//!
//! A [`RequestInformation`] is plain data: nothing here touches the network.
//! The adapter turns it into a concrete URL and a transport request only when
//! a terminal verb is invoked.

use crate::{config::RequestConfiguration, Error, Result};
use bytes::Bytes;
use http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Path parameter holding the service root. Filled in by the client facade or,
/// failing that, by the adapter.
pub const BASE_URL_KEY: &str = "baseurl";

/// Named values substituted into a [`PathTemplate`].
pub type PathParameters = BTreeMap<String, String>;

/// One segment of a resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A fixed segment such as `foo`.
    Literal(String),
    /// A segment filled from the path parameter with this name.
    Parameter(String),
}

/// An ordered list of path segments below the base URL.
///
/// Templates are immutable: [`literal`](Self::literal) and
/// [`parameter`](Self::parameter) return an extended copy.
///
/// # Examples
///
/// ```
/// use apisdk::request::PathTemplate;
///
/// let template = PathTemplate::new()
///     .literal("foo")
///     .parameter("foo_id")
///     .literal("bar");
///
/// assert_eq!(template.to_string(), "{+baseurl}/foo/{foo_id}/bar");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Creates a template pointing at the base URL itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy extended by a fixed segment.
    pub fn literal(&self, segment: impl Into<String>) -> Self {
        self.extended(Segment::Literal(segment.into()))
    }

    /// Returns a copy extended by a parameterized segment.
    pub fn parameter(&self, name: impl Into<String>) -> Self {
        self.extended(Segment::Parameter(name.into()))
    }

    /// The segments in path order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn extended(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{+{}}}", BASE_URL_KEY)?;
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => write!(f, "/{}", s)?,
                Segment::Parameter(name) => write!(f, "/{{{}}}", name)?,
            }
        }
        Ok(())
    }
}

/// Everything needed to issue one HTTP request.
///
/// # Examples
///
/// ```
/// use apisdk::request::{PathTemplate, RequestInformation, BASE_URL_KEY};
/// use http::Method;
///
/// let mut params = std::collections::BTreeMap::new();
/// params.insert(BASE_URL_KEY.to_string(), "https://api.example.com".to_string());
/// params.insert("foo_id".to_string(), "x".to_string());
///
/// let mut info = RequestInformation::new(
///     Method::GET,
///     PathTemplate::new().literal("foo").parameter("foo_id"),
///     params,
/// );
/// info.add_query_parameter("expand", "all");
///
/// assert_eq!(info.url().unwrap().as_str(), "https://api.example.com/foo/x?expand=all");
/// ```
#[derive(Debug, Clone)]
pub struct RequestInformation {
    /// The HTTP method.
    pub method: Method,

    /// The path below the base URL.
    pub url_template: PathTemplate,

    /// Values for the template's parameters, plus [`BASE_URL_KEY`].
    pub path_parameters: PathParameters,

    /// Query parameters in the order they are sent.
    pub query_parameters: Vec<(String, String)>,

    /// Request headers.
    pub headers: HeaderMap,

    /// Serialized request body.
    pub content: Option<Bytes>,

    /// Overrides the adapter timeout when set.
    pub timeout: Option<Duration>,

    raw_url: Option<Url>,
}

impl RequestInformation {
    /// Creates a request for the given template and path parameters.
    pub fn new(method: Method, url_template: PathTemplate, path_parameters: PathParameters) -> Self {
        Self {
            method,
            url_template,
            path_parameters,
            query_parameters: Vec::new(),
            headers: HeaderMap::new(),
            content: None,
            timeout: None,
            raw_url: None,
        }
    }

    /// Creates a request for an absolute URL, bypassing the template.
    pub fn for_url(method: Method, url: Url) -> Self {
        let mut info = Self::new(method, PathTemplate::new(), PathParameters::new());
        info.raw_url = Some(url);
        info
    }

    /// The absolute URL this request was pinned to, if any.
    pub fn raw_url(&self) -> Option<&Url> {
        self.raw_url.as_ref()
    }

    /// Returns `true` if the base URL is known, either as a path parameter or
    /// through a raw URL.
    pub fn has_base_url(&self) -> bool {
        self.raw_url.is_some() || self.path_parameters.contains_key(BASE_URL_KEY)
    }

    /// Assembles the final URL.
    ///
    /// Path parameter values are percent-encoded as single segments, so a value
    /// containing `/` never introduces extra path levels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPathParameter`] if the base URL or any template
    /// parameter is absent or empty, [`Error::InvalidPathParameter`] if a
    /// parameter is `.` or `..`, and [`Error::InvalidUrl`] if the base URL
    /// does not parse.
    pub fn url(&self) -> Result<Url> {
        let mut url = match &self.raw_url {
            Some(raw) => raw.clone(),
            None => self.expand_template()?,
        };

        if !self.query_parameters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_parameters {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn expand_template(&self) -> Result<Url> {
        let base = self
            .path_parameters
            .get(BASE_URL_KEY)
            .ok_or_else(|| Error::MissingPathParameter(BASE_URL_KEY.to_string()))?;
        let mut url = Url::parse(base)?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::ConfigurationError(format!("Base URL cannot have a path: {}", base))
            })?;
            segments.pop_if_empty();

            for segment in self.url_template.segments() {
                match segment {
                    Segment::Literal(literal) => {
                        segments.push(literal);
                    }
                    Segment::Parameter(name) => {
                        let value = self
                            .path_parameters
                            .get(name)
                            .filter(|value| !value.is_empty())
                            .ok_or_else(|| Error::MissingPathParameter(name.clone()))?;
                        if is_dot_segment(value) {
                            return Err(Error::InvalidPathParameter {
                                name: name.clone(),
                                value: value.clone(),
                            });
                        }
                        segments.push(value);
                    }
                }
            }
        }

        Ok(url)
    }

    /// Sets a header unless one with the same name is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the header value is invalid.
    pub fn try_add_header(&mut self, name: HeaderName, value: &str) -> Result<()> {
        let value = HeaderValue::try_from(value)
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.entry(name).or_insert(value);
        Ok(())
    }

    /// Appends a query parameter.
    pub fn add_query_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query_parameters.push((key.into(), value.into()));
    }

    /// Appends every field of a serializable struct as query parameters.
    ///
    /// `None` fields are skipped, sequences become repeated keys, and nested
    /// objects are rejected. Field names are taken from the serde
    /// representation, so `#[serde(rename = "pageSize")]` controls the wire name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `params` is not a flat struct.
    pub fn set_query_parameters<T: Serialize>(&mut self, params: &T) -> Result<()> {
        let value =
            serde_json::to_value(params).map_err(|e| Error::SerializationFailed(e.to_string()))?;

        let fields = match value {
            serde_json::Value::Object(fields) => fields,
            serde_json::Value::Null => return Ok(()),
            other => {
                return Err(Error::SerializationFailed(format!(
                    "query parameters must be a struct, got {}",
                    other
                )))
            }
        };

        for (key, value) in fields {
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        if let Some(item) = query_value(&key, item)? {
                            self.add_query_parameter(key.clone(), item);
                        }
                    }
                }
                other => {
                    if let Some(value) = query_value(&key, other)? {
                        self.add_query_parameter(key, value);
                    }
                }
            }
        }

        Ok(())
    }

    /// Serializes `body` as JSON and sets the matching `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if serialization fails.
    pub fn set_json_content<T: Serialize>(&mut self, body: &T) -> Result<()> {
        let json = serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.content = Some(Bytes::from(json));
        Ok(())
    }

    /// Applies a per-request configuration.
    pub fn configure(&mut self, config: &RequestConfiguration) {
        for (name, value) in &config.headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self.query_parameters
            .extend(config.query_parameters.iter().cloned());
        if config.timeout.is_some() {
            self.timeout = config.timeout;
        }
    }
}

fn query_value(key: &str, value: serde_json::Value) -> Result<Option<String>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(Error::SerializationFailed(format!(
            "query parameter `{}` must be a scalar or a list of scalars",
            key
        ))),
    }
}

fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}
