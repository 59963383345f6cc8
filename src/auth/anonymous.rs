use super::AuthenticationProvider;
use crate::{request::RequestInformation, Result};
use async_trait::async_trait;

/// Sends every request without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthenticationProvider;

#[async_trait]
impl AuthenticationProvider for AnonymousAuthenticationProvider {
    async fn authenticate_request(&self, _request: &mut RequestInformation) -> Result<()> {
        Ok(())
    }
}
