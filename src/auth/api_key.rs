use super::{allowed_hosts::ensure_secure, AllowedHostsValidator, AuthenticationProvider};
use crate::{request::RequestInformation, Error, Result};
use async_trait::async_trait;
use http::{HeaderName, HeaderValue};
use std::fmt;

/// Where an API key is placed on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    /// As a request header, e.g. `X-Api-Key: <key>`.
    Header,
    /// As a query parameter, e.g. `?api_key=<key>`.
    QueryParameter,
}

#[derive(Clone)]
enum Placement {
    Header(HeaderName, HeaderValue),
    Query(String, String),
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, name) = match self {
            Placement::Header(name, _) => ("Header", name.as_str()),
            Placement::Query(name, _) => ("Query", name.as_str()),
        };
        f.debug_tuple(kind).field(&name).field(&"<redacted>").finish()
    }
}

/// Authenticates requests with a static API key.
///
/// Keys are only attached for hosts accepted by the validator, and only over
/// https (loopback hosts excepted).
///
/// # Examples
///
/// ```
/// use apisdk::auth::{ApiKeyAuthenticationProvider, ApiKeyLocation};
///
/// let provider = ApiKeyAuthenticationProvider::new(
///     "secret-key",
///     "X-Api-Key",
///     ApiKeyLocation::Header,
///     ["api.example.com"],
/// )
/// .unwrap();
/// # let _ = provider;
/// ```
#[derive(Debug, Clone)]
pub struct ApiKeyAuthenticationProvider {
    placement: Placement,
    validator: AllowedHostsValidator,
}

impl ApiKeyAuthenticationProvider {
    /// Creates a provider placing `api_key` under `parameter_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if the key or name is empty, if
    /// they are not valid header material for [`ApiKeyLocation::Header`], or if
    /// an allowed host is malformed.
    pub fn new<I, S>(
        api_key: impl Into<String>,
        parameter_name: impl Into<String>,
        location: ApiKeyLocation,
        allowed_hosts: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let api_key = api_key.into();
        let parameter_name = parameter_name.into();
        if api_key.is_empty() {
            return Err(Error::ConfigurationError("API key cannot be empty".to_string()));
        }
        if parameter_name.is_empty() {
            return Err(Error::ConfigurationError(
                "API key parameter name cannot be empty".to_string(),
            ));
        }

        let placement = match location {
            ApiKeyLocation::Header => {
                let name = HeaderName::try_from(parameter_name.as_str()).map_err(|e| {
                    Error::ConfigurationError(format!("Invalid header name: {}", e))
                })?;
                let mut value = HeaderValue::try_from(api_key.as_str()).map_err(|e| {
                    Error::ConfigurationError(format!("Invalid header value: {}", e))
                })?;
                value.set_sensitive(true);
                Placement::Header(name, value)
            }
            ApiKeyLocation::QueryParameter => Placement::Query(parameter_name, api_key),
        };

        Ok(Self {
            placement,
            validator: AllowedHostsValidator::new(allowed_hosts)?,
        })
    }

    /// The hosts this provider attaches its key for.
    pub fn allowed_hosts_validator(&self) -> &AllowedHostsValidator {
        &self.validator
    }
}

#[async_trait]
impl AuthenticationProvider for ApiKeyAuthenticationProvider {
    async fn authenticate_request(&self, request: &mut RequestInformation) -> Result<()> {
        let url = request.url()?;
        if !self.validator.is_url_host_valid(&url) {
            tracing::trace!(host = ?url.host_str(), "Host not allowed, skipping API key");
            return Ok(());
        }
        ensure_secure(&url)?;

        match &self.placement {
            Placement::Header(name, value) => {
                request.headers.insert(name.clone(), value.clone());
            }
            Placement::Query(name, key) => {
                request.add_query_parameter(name.clone(), key.clone());
            }
        }
        Ok(())
    }
}
