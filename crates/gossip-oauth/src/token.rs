//! Opaque random values and the token endpoint's response body.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Random bytes behind an authorization code.
pub const CODE_BYTES: usize = 16;

/// Random bytes behind an access token.
pub const ACCESS_TOKEN_BYTES: usize = 32;

/// Random bytes behind a client `state` correlator.
pub const STATE_BYTES: usize = 16;

/// Token type reported by the token endpoint.
pub const BEARER: &str = "Bearer";

/// Generate `n_bytes` of CSPRNG output, URL-safe base64 encoded without padding.
#[must_use]
pub fn random_token(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Body of a successful `POST /token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl AccessTokenResponse {
    /// Bearer token response.
    #[must_use]
    pub fn bearer(access_token: String, expires_in: u64) -> Self {
        Self { access_token, token_type: BEARER.to_string(), expires_in: Some(expires_in) }
    }
}

impl std::fmt::Display for AccessTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself.
        write!(f, "token_type='{}', expires_in={:?}", self.token_type, self.expires_in)
    }
}
