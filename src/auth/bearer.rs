//! Bearer token authentication and the token providers behind it.

use super::{allowed_hosts::ensure_secure, AllowedHostsValidator, AuthenticationProvider};
use crate::{request::RequestInformation, Error, Result};
use async_trait::async_trait;
use http::{header::AUTHORIZATION, HeaderValue};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// Default time before expiry at which a cached token is refreshed.
const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(30);

const REDACTED: &str = "<redacted>";

/// Supplies bearer tokens for a target URL.
///
/// Return an empty string to send the request without credentials, for
/// example when the host is not in the allow-list.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns the token to send to `url`.
    async fn get_authorization_token(&self, url: &Url) -> Result<String>;

    /// The hosts this provider issues tokens for.
    fn allowed_hosts_validator(&self) -> &AllowedHostsValidator;
}

/// Sets `Authorization: Bearer <token>` using an [`AccessTokenProvider`].
///
/// Requests that already carry an `Authorization` header are left alone.
///
/// # Examples
///
/// ```
/// use apisdk::auth::{AllowedHostsValidator, BaseBearerTokenAuthenticationProvider, StaticAccessTokenProvider};
///
/// let provider = BaseBearerTokenAuthenticationProvider::new(StaticAccessTokenProvider::new(
///     "token-123",
///     AllowedHostsValidator::new(["api.example.com"]).unwrap(),
/// ));
/// # let _ = provider;
/// ```
#[derive(Debug)]
pub struct BaseBearerTokenAuthenticationProvider<P> {
    token_provider: P,
}

impl<P: AccessTokenProvider> BaseBearerTokenAuthenticationProvider<P> {
    /// Wraps a token provider.
    pub fn new(token_provider: P) -> Self {
        Self { token_provider }
    }

    /// The underlying token provider.
    pub fn token_provider(&self) -> &P {
        &self.token_provider
    }
}

#[async_trait]
impl<P: AccessTokenProvider> AuthenticationProvider for BaseBearerTokenAuthenticationProvider<P> {
    async fn authenticate_request(&self, request: &mut RequestInformation) -> Result<()> {
        if request.headers.contains_key(AUTHORIZATION) {
            tracing::trace!("Authorization header already present, skipping bearer token");
            return Ok(());
        }

        let url = request.url()?;
        let token = self.token_provider.get_authorization_token(&url).await?;
        if token.is_empty() {
            tracing::trace!(host = ?url.host_str(), "No token issued for host");
            return Ok(());
        }

        let mut value = HeaderValue::try_from(format!("Bearer {}", token))
            .map_err(|e| Error::Authentication(format!("Invalid token: {}", e)))?;
        value.set_sensitive(true);
        request.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Hands out one fixed token.
#[derive(Clone)]
pub struct StaticAccessTokenProvider {
    token: String,
    validator: AllowedHostsValidator,
}

impl fmt::Debug for StaticAccessTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAccessTokenProvider")
            .field("token", &REDACTED)
            .field("validator", &self.validator)
            .finish()
    }
}

impl StaticAccessTokenProvider {
    /// Issues `token` for every host `validator` accepts.
    pub fn new(token: impl Into<String>, validator: AllowedHostsValidator) -> Self {
        Self {
            token: token.into(),
            validator,
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessTokenProvider {
    async fn get_authorization_token(&self, url: &Url) -> Result<String> {
        if !self.validator.is_url_host_valid(url) {
            return Ok(String::new());
        }
        ensure_secure(url)?;
        Ok(self.token.clone())
    }

    fn allowed_hosts_validator(&self) -> &AllowedHostsValidator {
        &self.validator
    }
}

/// A token together with its expiry.
#[derive(Clone)]
pub struct AccessToken {
    /// The bearer credential itself.
    pub token: String,
    /// `None` means the token never expires.
    pub expires_at: Option<Instant>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &REDACTED)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// A token without expiry.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// A token valid for `lifetime` from now. A lifetime too long to
    /// represent is treated as no expiry.
    pub fn expiring_in(token: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            token: token.into(),
            expires_at: Instant::now().checked_add(lifetime),
        }
    }

    fn is_fresh(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now()
                .checked_add(margin)
                .is_some_and(|deadline| deadline < expires_at),
            None => true,
        }
    }
}

/// Obtains a new token, typically from an identity provider.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetches a new token. Called only while the cache is locked.
    async fn fetch_token(&self) -> Result<AccessToken>;
}

/// Caches a token from a [`TokenSource`] and refreshes it near expiry.
///
/// Refreshes are serialized: when several requests find the token stale at
/// once, only the first one calls the source and the rest reuse its result.
/// Dropping a request while it waits on a refresh cancels that refresh and
/// leaves the previous cache contents in place.
///
/// # Examples
///
/// ```
/// use apisdk::auth::{AccessToken, AllowedHostsValidator, CachingAccessTokenProvider, TokenSource};
/// use async_trait::async_trait;
/// use std::time::Duration;
///
/// struct Issuer;
///
/// #[async_trait]
/// impl TokenSource for Issuer {
///     async fn fetch_token(&self) -> apisdk::Result<AccessToken> {
///         Ok(AccessToken::expiring_in("fresh", Duration::from_secs(3600)))
///     }
/// }
///
/// let provider = CachingAccessTokenProvider::new(Issuer, AllowedHostsValidator::default())
///     .with_refresh_margin(Duration::from_secs(60));
/// # let _ = provider;
/// ```
#[derive(Debug)]
pub struct CachingAccessTokenProvider<S> {
    source: S,
    cached: Mutex<Option<AccessToken>>,
    refresh_margin: Duration,
    validator: AllowedHostsValidator,
}

impl<S: TokenSource> CachingAccessTokenProvider<S> {
    /// Creates a provider with an empty cache and the default refresh margin.
    pub fn new(source: S, validator: AllowedHostsValidator) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            validator,
        }
    }

    /// Sets how long before expiry a token is considered stale.
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Returns the cached token, refreshing it first if it is missing or stale.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(self.refresh_margin)) {
            return Ok(token.token.clone());
        }

        tracing::debug!("Refreshing access token");
        let token = self.source.fetch_token().await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next request fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[async_trait]
impl<S: TokenSource> AccessTokenProvider for CachingAccessTokenProvider<S> {
    async fn get_authorization_token(&self, url: &Url) -> Result<String> {
        if !self.validator.is_url_host_valid(url) {
            return Ok(String::new());
        }
        ensure_secure(url)?;
        self.token().await
    }

    fn allowed_hosts_validator(&self) -> &AllowedHostsValidator {
        &self.validator
    }
}
