//! OAuth2 Authorization Code Grant across three services.
//!
//! - **Authorization server** ([`authserver`]): logs users in, records consent, issues
//!   single-use codes, exchanges them for bearer tokens and introspects tokens.
//! - **Resource server** ([`resource`]): serves gossip per scope, redirects callers without a
//!   token and asks the authorization server about every token it sees.
//! - **Client** ([`client`]): follows the redirect chain on behalf of the user, exchanges the
//!   code and retries the resource request.
//!
//! # Example
//!
//! ```no_run
//! use gossip_oauth::{authserver, config::AuthServerConfig, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let router = authserver::create_app(AuthServerConfig::default());
//!     server::run_http("authserver", router, 8443).await
//! }
//! ```

pub mod authserver;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod pages;
pub mod resource;
pub mod server;
pub mod token;
pub mod urls;

pub use config::{AuthServerConfig, ClientConfig, ResourceConfig};
pub use error::{ServiceError, UpstreamError};
