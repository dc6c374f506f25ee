//! OAuth client: drives the redirect dance on behalf of the end user and keeps the tokens it
//! obtained.
//!
//! Provides:
//! - `GET /gossip?username=U`: user entry point
//! - `GET /callback/{scope}`: target of the authorization server's redirect
//! - Pending requests correlated by a random `state` (CSRF defense)
//! - A per-user access token cache

pub mod handlers;
pub mod pending;
pub mod upstream;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::config::ClientConfig;
use crate::server::health_check;

pub use pending::{PendingRequests, TokenCache};
pub use upstream::{ResourceReply, Upstream};

/// Shared state for client handlers.
#[derive(Debug)]
pub struct ClientState {
    pub upstream: Upstream,
    pub pending: PendingRequests,
    pub tokens: TokenCache,
}

impl ClientState {
    /// Create client state from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the outbound HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        Ok(Self {
            upstream: Upstream::new(config)?,
            pending: PendingRequests::new(config.pending_ttl),
            tokens: TokenCache::new(),
        })
    }
}

/// Create the client router.
pub fn create_router(state: Arc<ClientState>) -> Router {
    Router::new()
        .route("/health", get(|| health_check("client")))
        .route("/gossip", get(handlers::handle_gossip))
        .route("/callback/{scope}", get(handlers::handle_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router over [`ClientState::new`].
///
/// # Errors
///
/// See [`ClientState::new`].
pub fn create_app(config: &ClientConfig) -> anyhow::Result<Router> {
    Ok(create_router(Arc::new(ClientState::new(config)?)))
}
