//! Authorization server: authenticates users, records consent, issues single-use codes,
//! exchanges them for bearer tokens and answers introspection requests.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::config::AuthServerConfig;
use crate::server::health_check;

pub use store::GrantStore;

/// Shared state for authorization server handlers.
#[derive(Debug)]
pub struct AuthServerState {
    pub store: GrantStore,
    pub config: AuthServerConfig,
}

impl AuthServerState {
    /// State over the seeded demo registries.
    #[must_use]
    pub fn new(config: AuthServerConfig) -> Self {
        let store =
            GrantStore::seeded(&config.client_secret, config.token_lifetime, config.code_lifetime);
        Self { store, config }
    }
}

/// Create the authorization server router.
pub fn create_router(state: Arc<AuthServerState>) -> Router {
    Router::new()
        .route("/health", get(|| health_check("authserver")))
        .route(
            "/authorization",
            get(handlers::handle_authorization_form).post(handlers::handle_authorization),
        )
        .route("/authorization/revoke", post(handlers::handle_revoke))
        .route("/token", post(handlers::handle_token))
        .route("/accesscheck", post(handlers::handle_access_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router plus the background sweep of expired grants.
pub fn create_app(config: AuthServerConfig) -> Router {
    let state = Arc::new(AuthServerState::new(config));
    state.store.start_cleanup_task();
    create_router(state)
}
