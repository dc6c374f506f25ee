//! Outbound calls made by the client: the resource request and the code exchange.
//!
//! One reqwest client with bounded timeouts and redirects disabled: the client has to see the
//! resource server's 303 itself so it can forward it to the browser.

use reqwest::{Client, StatusCode, header, redirect};
use url::Url;

use crate::config::ClientConfig;
use crate::credentials::BasicCredentials;
use crate::error::{UpstreamError, UpstreamResult};
use crate::token::AccessTokenResponse;
use crate::urls::{endpoint, service_base};

/// What the resource server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceReply {
    /// 303: send the browser to this location.
    Redirect(String),
    /// 200: the gossip items.
    Items(Vec<String>),
}

/// HTTP access to the resource server and authorization servers.
#[derive(Debug, Clone)]
pub struct Upstream {
    http: Client,
    resource_base: Url,
    credentials: BasicCredentials,
    self_host: String,
    self_port: u16,
    timeout: std::time::Duration,
}

impl Upstream {
    /// Create the outbound client for `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or the resource server location is
    /// invalid.
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .build()?;

        Ok(Self {
            http,
            resource_base: service_base(&config.resource_host, config.resource_port)?,
            credentials: BasicCredentials::new(&config.client_id, &config.client_secret),
            self_host: config.host.clone(),
            self_port: config.port,
            timeout: config.timeouts.request,
        })
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// `GET {resource}/gossip/{username}?host&port&client_id&state`, with the bearer token if
    /// one is known.
    pub async fn fetch_gossip(
        &self,
        username: &str,
        state: &str,
        access_token: Option<&str>,
    ) -> UpstreamResult<ResourceReply> {
        let url = endpoint(&self.resource_base, &["gossip", username])?;
        let target = url.path().to_string();
        let port = self.self_port.to_string();

        let mut request = self.http.get(url).query(&[
            ("host", self.self_host.as_str()),
            ("port", port.as_str()),
            ("client_id", self.client_id()),
            ("state", state),
        ]);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&target, e, self.timeout))?;

        match response.status() {
            StatusCode::SEE_OTHER => {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| UpstreamError::Decode {
                        endpoint: target.clone(),
                        message: "303 without a Location header".into(),
                    })?;
                Ok(ResourceReply::Redirect(location.to_string()))
            }
            StatusCode::OK => {
                let items: Vec<String> = response
                    .json()
                    .await
                    .map_err(|e| UpstreamError::from_reqwest(&target, e, self.timeout))?;
                Ok(ResourceReply::Items(items))
            }
            status => Err(UpstreamError::unexpected_status(target, status.as_u16())),
        }
    }

    /// `POST {auth_base}/token` with `grant_type=authorization_code`, authenticated as this
    /// client.
    pub async fn exchange_code(
        &self,
        auth_base: &Url,
        auth_code: &str,
    ) -> UpstreamResult<AccessTokenResponse> {
        let url = endpoint(auth_base, &["token"])?;
        let target = url.to_string();

        let response = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, self.credentials.to_header_value())
            .header(header::ACCEPT, "application/json")
            .form(&[("grant_type", "authorization_code"), ("authorization_code", auth_code)])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&target, e, self.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::unexpected_status(target, status.as_u16()));
        }

        response.json().await.map_err(|e| UpstreamError::from_reqwest(&target, e, self.timeout))
    }
}
