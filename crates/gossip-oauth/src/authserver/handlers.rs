//! Authorization server endpoint handlers.
//!
//! - `GET /authorization`: login + consent form
//! - `POST /authorization`: authenticate, record consent, issue a code
//! - `POST /authorization/revoke`: withdraw a consent
//! - `POST /token`: exchange a code for a bearer token
//! - `POST /accesscheck`: token introspection for resource servers

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Query, State, rejection::FormRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::AuthServerState;
use super::store::{IntrospectionError, RedeemError};
use crate::credentials::BasicCredentials;
use crate::error::{ServiceError, ServiceResult};
use crate::pages::{LoginForm, render_login_page};
use crate::token::AccessTokenResponse;
use crate::urls::{CallbackUrl, code_redirect};

// ─── Authorization Endpoint ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthorizationQuery {
    #[serde(default)]
    pub callback_url: String,
    #[serde(default)]
    pub client_id: String,
}

/// `GET /authorization`
///
/// The query extractor has already percent-decoded `callback_url`; it must now parse as an
/// absolute URL.
pub async fn handle_authorization_form(
    Query(query): Query<AuthorizationQuery>,
) -> ServiceResult<Html<String>> {
    let callback_url = CallbackUrl::parse(&query.callback_url)?;
    tracing::info!(callback_url = %callback_url, client_id = %query.client_id, "Show authorization form");

    Ok(Html(render_login_page(&LoginForm {
        callback_url: callback_url.to_string(),
        client_id: query.client_id,
    })))
}

#[derive(Deserialize)]
pub struct AuthorizationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub callback_url: String,
}

/// `POST /authorization`
///
/// Authenticates the user, records their consent for the client and redirects back to the
/// client's callback with `auth_host`, `auth_port` and `auth_code` appended.
pub async fn handle_authorization(
    State(state): State<Arc<AuthServerState>>,
    form: Result<Form<AuthorizationForm>, FormRejection>,
) -> ServiceResult<Response> {
    let Form(form) = form?;
    let store = &state.store;

    if !store.verify_user(&form.username, &form.password) {
        return Err(ServiceError::unauthorized(format!("login failed for '{}'", form.username)));
    }

    // Consent only proves the client identifier is known; the secret is checked at /token.
    if !store.is_registered_client(&form.client_id) {
        return Err(ServiceError::unauthorized(format!(
            "client '{}' is unknown, no consent recorded for '{}'",
            form.client_id, form.username
        )));
    }
    store.grant_consent(&form.username, &form.client_id).await;
    tracing::info!(username = %form.username, client_id = %form.client_id, "Recorded consent");

    let callback_url = CallbackUrl::parse(&form.callback_url)?;

    let code = store.issue_code(&form.username).await;
    let location = code_redirect(
        &callback_url,
        &state.config.public_host,
        state.config.public_port,
        &code,
    );

    tracing::info!(username = %form.username, callback = %callback_url, "Issued authorization code");

    Ok(Redirect::to(location.as_str()).into_response())
}

#[derive(Deserialize)]
pub struct RevokeForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub client_id: String,
}

/// `POST /authorization/revoke`
pub async fn handle_revoke(
    State(state): State<Arc<AuthServerState>>,
    form: Result<Form<RevokeForm>, FormRejection>,
) -> ServiceResult<StatusCode> {
    let Form(form) = form?;
    if !state.store.verify_user(&form.username, &form.password) {
        return Err(ServiceError::unauthorized(format!("login failed for '{}'", form.username)));
    }

    let existed = state.store.revoke_consent(&form.username, &form.client_id).await;
    tracing::info!(
        username = %form.username,
        client_id = %form.client_id,
        existed,
        "Revoked consent"
    );

    Ok(StatusCode::OK)
}

// ─── Token Endpoint ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub authorization_code: String,
}

/// `POST /token`
///
/// Exchange an authorization code for a bearer token. The client authenticates with
/// `Authorization: Basic`.
pub async fn handle_token(
    State(state): State<Arc<AuthServerState>>,
    headers: HeaderMap,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> ServiceResult<Response> {
    let store = &state.store;

    // Client authentication comes before anything in the body.
    let credentials = BasicCredentials::from_headers(&headers)?;
    if !store.verify_client(&credentials.client_id, &credentials.client_secret) {
        return Err(ServiceError::unauthorized(format!(
            "client '{}' failed authentication",
            credentials.client_id
        )));
    }
    let Form(form) = form?;

    if form.grant_type != "authorization_code" {
        return Err(ServiceError::bad_request(format!(
            "grant_type '{}' not supported",
            form.grant_type
        )));
    }

    let username = match store.redeem_code(&form.authorization_code, &credentials.client_id).await {
        Ok(username) => username,
        Err(RedeemError::UnknownCode) => {
            return Err(ServiceError::unauthorized("authorization code invalid or already used"));
        }
        Err(RedeemError::NotAuthorized) => {
            return Err(ServiceError::unauthorized(format!(
                "client '{}' is not authorized by the code's owner",
                credentials.client_id
            )));
        }
    };

    let issued = store.issue_token(&username).await;
    tracing::info!(client_id = %credentials.client_id, scope = %issued.scope, "Issued access token");

    Ok(token_success(AccessTokenResponse::bearer(
        issued.access_token,
        issued.expires_in.as_secs(),
    )))
}

/// Build a token response with required OAuth 2.0 cache headers (RFC 6749 §5.1).
fn token_success(body: AccessTokenResponse) -> Response {
    let mut response = Json(body).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

// ─── Introspection Endpoint ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AccessCheckForm {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
}

/// `POST /accesscheck`
///
/// `200` with an empty body when the token exists, matches `scope` and has not expired.
pub async fn handle_access_check(
    State(state): State<Arc<AuthServerState>>,
    form: Result<Form<AccessCheckForm>, FormRejection>,
) -> ServiceResult<StatusCode> {
    let Form(form) = form.map_err(|e| {
        ServiceError::forbidden(format!("unreadable introspection request: {}", e.body_text()))
    })?;
    match state.store.introspect(&form.access_token, &form.scope).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(IntrospectionError::UnknownToken) => Err(ServiceError::forbidden("unknown access token")),
        Err(IntrospectionError::ScopeMismatch) => {
            Err(ServiceError::forbidden(format!("token not valid for scope '{}'", form.scope)))
        }
        Err(IntrospectionError::Expired) => Err(ServiceError::forbidden("access token expired")),
    }
}
