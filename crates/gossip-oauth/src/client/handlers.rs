//! Client endpoints: the user-facing `/gossip` entry point and the `/callback/{scope}` the
//! authorization server redirects the browser to.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::ClientState;
use super::upstream::ResourceReply;
use crate::error::{ServiceError, ServiceResult};
use crate::pages::{GossipPage, render_gossip_page};
use crate::urls::service_base;

/// Result of asking the resource server for a user's gossip.
#[derive(Debug)]
pub enum GossipOutcome {
    /// Forward this redirect to the browser; the flow continues at the callback.
    Redirect(String),
    /// Render the gossip.
    Page(GossipPage),
}

impl IntoResponse for GossipOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(location) => Redirect::to(&location).into_response(),
            Self::Page(page) => Html(render_gossip_page(&page)).into_response(),
        }
    }
}

/// Request the resource for `username`, attaching the cached token if there is one.
///
/// A fresh `state` is registered before the call. It stays pending only if the resource
/// server redirects; otherwise it is discarded.
pub async fn request_gossip(state: &ClientState, username: &str) -> ServiceResult<GossipOutcome> {
    let flow_state = state.pending.begin(username).await;
    let access_token = state.tokens.get(username).await;

    let reply =
        state.upstream.fetch_gossip(username, &flow_state, access_token.as_deref()).await;

    match reply {
        Ok(ResourceReply::Redirect(location)) => {
            tracing::info!(username = %username, "Forwarding redirect to authorization server");
            Ok(GossipOutcome::Redirect(location))
        }
        Ok(ResourceReply::Items(items)) => {
            state.pending.discard(&flow_state).await;
            tracing::info!(username = %username, count = items.len(), "Received gossip");
            Ok(GossipOutcome::Page(GossipPage { user: username.to_owned(), items }))
        }
        Err(e) => {
            state.pending.discard(&flow_state).await;
            if e.status() == Some(403) && access_token.is_some() {
                // The next request for this user starts a new flow.
                tracing::warn!(username = %username, "Cached access token rejected, evicting");
                state.tokens.evict(username).await;
            }
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GossipQuery {
    #[serde(default)]
    pub username: String,
}

/// `GET /gossip?username=U`
pub async fn handle_gossip(
    State(state): State<Arc<ClientState>>,
    Query(query): Query<GossipQuery>,
) -> ServiceResult<GossipOutcome> {
    if query.username.is_empty() {
        return Err(ServiceError::bad_request("username is required"));
    }
    tracing::info!(username = %query.username, "Gossip requested by user");

    request_gossip(&state, &query.username).await
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub auth_host: String,
    #[serde(default)]
    pub auth_port: String,
    #[serde(default)]
    pub auth_code: String,
    #[serde(default)]
    pub state: String,
}

/// `GET /callback/{scope}?auth_host&auth_port&auth_code&state`
///
/// Only a callback whose `state` matches a pending request gets its code exchanged.
pub async fn handle_callback(
    State(state): State<Arc<ClientState>>,
    Path(scope): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> ServiceResult<GossipOutcome> {
    let Some(mut flow) = state.pending.take(&query.state).await else {
        return Err(ServiceError::bad_request("state does not match any pending request"));
    };

    if flow.username != scope {
        return Err(ServiceError::bad_request(format!(
            "callback scope '{scope}' does not match pending request for '{}'",
            flow.username
        )));
    }
    flow.code_issued()?;

    let auth_port: u16 = query
        .auth_port
        .parse()
        .map_err(|_| ServiceError::bad_request(format!("invalid auth_port '{}'", query.auth_port)))?;
    let auth_base = service_base(&query.auth_host, auth_port).map_err(|e| {
        ServiceError::bad_request(format!("invalid auth_host '{}': {e}", query.auth_host))
    })?;

    tracing::info!(scope = %scope, authserver = %auth_base, "Exchanging authorization code");

    let token = state.upstream.exchange_code(&auth_base, &query.auth_code).await?;
    flow.token_issued()?;
    tracing::info!(username = %flow.username, token = %token, "Received access token");

    state.tokens.insert(&flow.username, token.access_token).await;

    request_gossip(&state, &flow.username).await
}
