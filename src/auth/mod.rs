//! Authentication strategies applied to outgoing requests.
//!
//! An [`AuthenticationProvider`] is chosen when the adapter is built and is
//! shared by every request the adapter sends. Providers only decorate the
//! [`RequestInformation`]; they never send the request themselves.
//!
//! | Provider | Effect |
//! |----------|--------|
//! | [`AnonymousAuthenticationProvider`] | none |
//! | [`ApiKeyAuthenticationProvider`] | key in a header or query parameter |
//! | [`BaseBearerTokenAuthenticationProvider`] | `Authorization: Bearer <token>` |

mod allowed_hosts;
mod anonymous;
mod api_key;
mod bearer;

pub use allowed_hosts::AllowedHostsValidator;
pub use anonymous::AnonymousAuthenticationProvider;
pub use api_key::{ApiKeyAuthenticationProvider, ApiKeyLocation};
pub use bearer::{
    AccessToken, AccessTokenProvider, BaseBearerTokenAuthenticationProvider,
    CachingAccessTokenProvider, StaticAccessTokenProvider, TokenSource,
};

use crate::{request::RequestInformation, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Attaches credentials to an outgoing request, or declines to.
///
/// Implementations must be safe to share across concurrently running
/// requests. Any suspension inside `authenticate_request` (a token refresh,
/// for example) is cancelled when the caller drops the request future.
///
/// # Examples
///
/// ```
/// use apisdk::{request::RequestInformation, AuthenticationProvider};
/// use async_trait::async_trait;
///
/// struct TenantHeader(&'static str);
///
/// #[async_trait]
/// impl AuthenticationProvider for TenantHeader {
///     async fn authenticate_request(&self, request: &mut RequestInformation) -> apisdk::Result<()> {
///         request.headers.insert("x-tenant", http::HeaderValue::from_static(self.0));
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    /// Decorates `request` with credentials.
    ///
    /// The request's base URL is already set when the adapter calls this, so
    /// [`RequestInformation::url`] can be used to inspect the target host.
    async fn authenticate_request(&self, request: &mut RequestInformation) -> Result<()>;
}

#[async_trait]
impl<T> AuthenticationProvider for Arc<T>
where
    T: AuthenticationProvider + ?Sized,
{
    async fn authenticate_request(&self, request: &mut RequestInformation) -> Result<()> {
        (**self).authenticate_request(request).await
    }
}
