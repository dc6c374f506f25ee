//! `GET /gossip/{scope}`: the protected resource.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::ResourceState;
use crate::credentials::bearer_token;
use crate::error::{ServiceError, ServiceResult};
use crate::urls::{authorization_redirect, client_callback};

/// Where the requesting client lives and what it wants echoed back.
#[derive(Debug, Deserialize)]
pub struct GossipQuery {
    pub host: Option<String>,
    pub port: Option<String>,
    pub client_id: Option<String>,
    pub state: Option<String>,
}

/// `GET /gossip/{scope}`
///
/// Without a bearer token the caller is redirected (303) to the authorization server, with a
/// callback pointing at the requesting client. With a token, access is decided by the
/// authorization server.
pub async fn handle_gossip(
    State(state): State<Arc<ResourceState>>,
    Path(scope): Path<String>,
    Query(query): Query<GossipQuery>,
    headers: HeaderMap,
) -> ServiceResult<Response> {
    let Some(items) = state.catalog.get(&scope) else {
        return Err(ServiceError::not_found(format!("no gossip for '{scope}'")));
    };
    tracing::info!(scope = %scope, "Gossip requested");

    let Some(access_token) = bearer_token(&headers) else {
        return redirect_to_authorization(&state, &scope, &query);
    };

    if let Err(e) = state.introspector.check(&access_token, &scope).await {
        // Fail closed: unreachable, slow or negative introspection all deny.
        tracing::warn!(scope = %scope, error = %e, remote_status = ?e.status(), "Access denied");
        return Err(ServiceError::forbidden(format!("token rejected for scope '{scope}'")));
    }

    tracing::info!(scope = %scope, count = items.len(), "Returning gossip");
    Ok(Json(items.to_vec()).into_response())
}

fn redirect_to_authorization(
    state: &ResourceState,
    scope: &str,
    query: &GossipQuery,
) -> ServiceResult<Response> {
    let (Some(host), Some(port), Some(client_id), Some(client_state)) = (
        query.host.as_deref(),
        query.port.as_deref(),
        query.client_id.as_deref(),
        query.state.as_deref(),
    ) else {
        return Err(ServiceError::bad_request(
            "host, port, client_id and state are required without a bearer token",
        ));
    };

    let callback = client_callback(host, port, scope, client_state)?;
    let location = authorization_redirect(&state.auth_base, &callback, client_id)
        .map_err(|e| ServiceError::internal(format!("build authorization redirect: {e}")))?;
    let location = HeaderValue::from_str(location.as_str())
        .map_err(|e| ServiceError::internal(format!("redirect location: {e}")))?;

    tracing::info!(scope = %scope, client_id = %client_id, "Redirecting to authorization server");

    Ok((
        StatusCode::SEE_OTHER,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static("bearer")), (header::LOCATION, location)],
    )
        .into_response())
}
