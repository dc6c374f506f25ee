//! Resource server: guards the gossip catalog and delegates every trust decision to the
//! authorization server.

pub mod catalog;
pub mod handlers;
pub mod introspect;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::ResourceConfig;
use crate::server::health_check;
use crate::urls::service_base;

pub use catalog::GossipCatalog;
pub use introspect::{HttpIntrospector, Introspector};

/// Shared state for resource server handlers.
pub struct ResourceState {
    pub catalog: GossipCatalog,
    /// Base URL of the authorization server.
    pub auth_base: Url,
    pub introspector: Arc<dyn Introspector>,
}

impl ResourceState {
    /// State with the seeded catalog and HTTP introspection.
    ///
    /// # Errors
    ///
    /// Returns error if the authorization server location is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ResourceConfig) -> anyhow::Result<Self> {
        let auth_base = service_base(&config.authserver_host, config.authserver_port)?;
        let introspector = HttpIntrospector::new(&auth_base, config.timeouts)?;
        Ok(Self { catalog: GossipCatalog::seeded(), auth_base, introspector: Arc::new(introspector) })
    }
}

impl std::fmt::Debug for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceState").field("auth_base", &self.auth_base.as_str()).finish()
    }
}

/// Create the resource server router.
pub fn create_router(state: Arc<ResourceState>) -> Router {
    Router::new()
        .route("/health", get(|| health_check("resource")))
        .route("/gossip/{scope}", get(handlers::handle_gossip))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router over [`ResourceState::new`].
///
/// # Errors
///
/// See [`ResourceState::new`].
pub fn create_app(config: &ResourceConfig) -> anyhow::Result<Router> {
    Ok(create_router(Arc::new(ResourceState::new(config)?)))
}
