//! `Authorization` header credentials.
//!
//! Basic credentials get an explicit parser because the token endpoint has to tell a
//! missing/malformed header (400) apart from wrong credentials (401). Bearer tokens go through
//! the typed headers of `axum-extra`, where absent and malformed look the same.

use axum::http::{HeaderMap, header};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

use crate::error::CredentialsError;

const BASIC: &str = "Basic";

/// `client_id:client_secret` pair carried in `Authorization: Basic`.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl BasicCredentials {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    /// Parse a header value of the form `Basic <base64(client_id:client_secret)>`.
    ///
    /// The payload may use the standard alphabet (RFC 7617) or the unpadded URL-safe one.
    pub fn parse(value: &str) -> Result<Self, CredentialsError> {
        let malformed = CredentialsError::Malformed { scheme: BASIC };
        let mut fields = value.split_whitespace();
        let (Some(scheme), Some(payload), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed);
        };
        if scheme != BASIC {
            return Err(malformed);
        }

        let decoded = STANDARD
            .decode(payload)
            .or_else(|_| URL_SAFE_NO_PAD.decode(payload))
            .map_err(|_| CredentialsError::Encoding)?;
        let decoded = String::from_utf8(decoded).map_err(|_| CredentialsError::Encoding)?;

        let (client_id, client_secret) = decoded.split_once(':').ok_or(CredentialsError::Shape)?;
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(CredentialsError::Shape);
        }
        Ok(Self::new(client_id, client_secret))
    }

    /// Parse the `Authorization` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, CredentialsError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(CredentialsError::Malformed { scheme: BASIC })?;
        Self::parse(value)
    }

    /// Encode as an `Authorization` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("{BASIC} {}", STANDARD.encode(raw))
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials").field("client_id", &self.client_id).finish()
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Returns `None` when the header is absent or not a well-formed bearer credential.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
}
