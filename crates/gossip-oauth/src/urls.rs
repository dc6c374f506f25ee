//! Typed construction of the URLs that move the flow between parties.

use url::Url;

use crate::error::ServiceError;

/// `http://{host}:{port}` of a peer service.
///
/// `host` must be a bare host name or IP address; anything carrying a path or query is rejected.
pub fn service_base(host: &str, port: u16) -> Result<Url, url::ParseError> {
    let mut url = Url::parse("http://localhost")?;
    url.set_host(Some(host))?;
    url.set_port(Some(port)).map_err(|()| url::ParseError::InvalidPort)?;
    Ok(url)
}

/// `{base}/{segments...}`, each segment percent-encoded.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .clear()
        .extend(segments);
    Ok(url)
}

/// Absolute URL a client asked to be called back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrl(Url);

impl CallbackUrl {
    /// Parse and validate: absolute, `http` or `https`, with a host.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let url = Url::parse(raw)
            .map_err(|e| ServiceError::bad_request(format!("parse callback_url '{raw}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ServiceError::bad_request(format!(
                "callback_url '{raw}' must be an absolute http(s) URL"
            )));
        }
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CallbackUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// `http://{host}:{port}/callback/{scope}?state={state}`, built by the resource server for the
/// requesting client.
pub fn client_callback(
    host: &str,
    port: &str,
    scope: &str,
    state: &str,
) -> Result<CallbackUrl, ServiceError> {
    let port: u16 = port
        .parse()
        .map_err(|_| ServiceError::bad_request(format!("invalid client port '{port}'")))?;
    let base = service_base(host, port)
        .map_err(|e| ServiceError::bad_request(format!("invalid client host '{host}': {e}")))?;
    let mut url = endpoint(&base, &["callback", scope])
        .map_err(|e| ServiceError::bad_request(format!("build callback url: {e}")))?;
    url.query_pairs_mut().append_pair("state", state);
    Ok(CallbackUrl(url))
}

/// `{auth_base}/authorization?callback_url=...&client_id=...`
pub fn authorization_redirect(
    auth_base: &Url,
    callback: &CallbackUrl,
    client_id: &str,
) -> Result<Url, url::ParseError> {
    let mut url = endpoint(auth_base, &["authorization"])?;
    url.query_pairs_mut()
        .append_pair("callback_url", callback.as_str())
        .append_pair("client_id", client_id);
    Ok(url)
}

/// The client's callback URL with the authorization server's location and the fresh code
/// appended. Existing query pairs (the client's `state`) are kept.
#[must_use]
pub fn code_redirect(callback: &CallbackUrl, auth_host: &str, auth_port: u16, code: &str) -> Url {
    let mut url = callback.0.clone();
    url.query_pairs_mut()
        .append_pair("auth_host", auth_host)
        .append_pair("auth_port", &auth_port.to_string())
        .append_pair("auth_code", code);
    url
}
