//! Token validation against the authorization server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Timeouts;
use crate::error::{UpstreamError, UpstreamResult};
use crate::urls::endpoint;

/// Decides whether a bearer token grants access to a scope.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// `Ok(())` only if the token is valid for `scope`. Any error means "deny".
    async fn check(&self, access_token: &str, scope: &str) -> UpstreamResult<()>;
}

/// Calls `POST {authserver}/accesscheck`.
#[derive(Debug, Clone)]
pub struct HttpIntrospector {
    client: Client,
    endpoint: Url,
    timeouts: Timeouts,
}

impl HttpIntrospector {
    /// Create an introspector for the authorization server at `auth_base`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or the endpoint URL is invalid.
    pub fn new(auth_base: &Url, timeouts: Timeouts) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()?;
        let endpoint = endpoint(auth_base, &["accesscheck"])?;
        Ok(Self { client, endpoint, timeouts })
    }
}

#[async_trait]
impl Introspector for HttpIntrospector {
    async fn check(&self, access_token: &str, scope: &str) -> UpstreamResult<()> {
        let endpoint = self.endpoint.as_str();
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("access_token", access_token), ("scope", scope)])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(endpoint, e, self.timeouts.request))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::unexpected_status(endpoint, status.as_u16()));
        }
        Ok(())
    }
}
