//! Gossip OAuth - Entry Point
//!
//! Runs one of the three services: authorization server, resource server or client.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gossip_oauth::config::{
    AuthServerConfig, ClientConfig, ResourceConfig, Timeouts, defaults,
};
use gossip_oauth::{authserver, client, resource, server};

#[derive(Parser, Debug)]
#[command(name = "gossip-oauth")]
#[command(about = "OAuth2 authorization code grant demo services")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    service: Service,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Timeout for outbound HTTP calls, in seconds
    #[arg(long, default_value = "5", env = "REQUEST_TIMEOUT_SECS", global = true)]
    request_timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Service {
    /// Authorization server (login, consent, codes, tokens, introspection)
    Authserver {
        /// Listen port
        #[arg(long, default_value_t = defaults::AUTHSERVER_PORT, env = "PORT")]
        port: u16,

        /// Host announced to clients as `auth_host`
        #[arg(long, default_value = defaults::HOST, env = "AUTH_PUBLIC_HOST")]
        public_host: String,

        /// Port announced to clients as `auth_port` (defaults to the listen port)
        #[arg(long, env = "AUTH_PUBLIC_PORT")]
        public_port: Option<u16>,

        /// Access token lifetime, in seconds
        #[arg(long, default_value = "30", env = "TOKEN_LIFETIME_SECS")]
        token_lifetime_secs: u64,

        /// Authorization code lifetime, in seconds
        #[arg(long, default_value = "600", env = "CODE_LIFETIME_SECS")]
        code_lifetime_secs: u64,

        /// Secret of the registered client
        #[arg(long, default_value = defaults::CLIENT_SECRET, env = "CLIENT_SECRET", hide_default_value = true)]
        client_secret: String,
    },

    /// Resource server (gossip per user)
    Resource {
        /// Listen port
        #[arg(long, default_value_t = defaults::RESOURCE_PORT, env = "PORT")]
        port: u16,

        /// Authorization server host
        #[arg(long, default_value = defaults::HOST, env = "AUTHSERVER_HOST")]
        authserver_host: String,

        /// Authorization server port
        #[arg(long, default_value_t = defaults::AUTHSERVER_PORT, env = "AUTHSERVER_PORT")]
        authserver_port: u16,
    },

    /// Client (user entry point and OAuth callback)
    Client {
        /// Host announced to the resource server for callbacks
        #[arg(long, default_value = defaults::HOST, env = "HOST")]
        host: String,

        /// Listen port, also announced for callbacks
        #[arg(long, default_value_t = defaults::CLIENT_PORT, env = "PORT")]
        port: u16,

        /// Resource server host
        #[arg(long, default_value = defaults::HOST, env = "RESOURCE_HOST")]
        resource_host: String,

        /// Resource server port
        #[arg(long, default_value_t = defaults::RESOURCE_PORT, env = "RESOURCE_PORT")]
        resource_port: u16,

        /// Client identifier
        #[arg(long, default_value = defaults::CLIENT_ID, env = "CLIENT_ID")]
        client_id: String,

        /// Client secret
        #[arg(long, default_value = defaults::CLIENT_SECRET, env = "CLIENT_SECRET", hide_default_value = true)]
        client_secret: String,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let timeouts = Timeouts {
        request: Duration::from_secs(cli.request_timeout_secs),
        ..Timeouts::default()
    };

    match cli.service {
        Service::Authserver {
            port,
            public_host,
            public_port,
            token_lifetime_secs,
            code_lifetime_secs,
            client_secret,
        } => {
            let mut config = AuthServerConfig::new(public_host, public_port.unwrap_or(port))
                .with_token_lifetime(Duration::from_secs(token_lifetime_secs))
                .with_code_lifetime(Duration::from_secs(code_lifetime_secs));
            config.client_secret = client_secret;

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                public_host = %config.public_host,
                public_port = config.public_port,
                token_lifetime_secs,
                "Starting authorization server"
            );
            server::run_http("authserver", authserver::create_app(config), port).await?;
        }
        Service::Resource { port, authserver_host, authserver_port } => {
            let mut config = ResourceConfig::new(authserver_host, authserver_port);
            config.timeouts = timeouts;

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                authserver = %format!("{}:{}", config.authserver_host, config.authserver_port),
                "Starting resource server"
            );
            server::run_http("resource", resource::create_app(&config)?, port).await?;
        }
        Service::Client { host, port, resource_host, resource_port, client_id, client_secret } => {
            let mut config = ClientConfig::new(host, port, resource_host, resource_port)
                .with_credentials(client_id, client_secret);
            config.timeouts = timeouts;

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                client_id = %config.client_id,
                resource = %format!("{}:{}", config.resource_host, config.resource_port),
                "Starting client"
            );
            server::run_http("client", client::create_app(&config)?, port).await?;
        }
    }

    Ok(())
}
