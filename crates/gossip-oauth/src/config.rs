//! Configuration for the authorization server, resource server and client.

use std::time::Duration;

/// Default values shared by the three services.
pub mod defaults {
    use std::time::Duration;

    /// Authorization server listen port.
    pub const AUTHSERVER_PORT: u16 = 8443;

    /// Resource server listen port.
    pub const RESOURCE_PORT: u16 = 8000;

    /// Client listen port.
    pub const CLIENT_PORT: u16 = 1234;

    /// Host every service advertises unless told otherwise.
    pub const HOST: &str = "localhost";

    /// Registered client identifier.
    pub const CLIENT_ID: &str = "gossip_client";

    /// Secret of the registered client.
    pub const CLIENT_SECRET: &str = "43897dfa-c910-4d3c-9851-5328cf49467d";

    /// Access token lifetime (30 seconds).
    pub const TOKEN_LIFETIME: Duration = Duration::from_secs(30);

    /// Authorization code lifetime (10 minutes).
    pub const CODE_LIFETIME: Duration = Duration::from_secs(600);

    /// How long a client waits for a callback before forgetting the `state` (10 minutes).
    pub const PENDING_REQUEST_TTL: Duration = Duration::from_secs(600);

    /// Interval of the expired grant sweep.
    pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

    /// Outbound request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Outbound connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Maximum cached access tokens on the client.
    pub const TOKEN_CACHE_MAX_SIZE: u64 = 10_000;
}

/// Timeouts applied to every outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Whole-request timeout.
    pub request: Duration,

    /// Connection establishment timeout.
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request: defaults::REQUEST_TIMEOUT, connect: defaults::CONNECT_TIMEOUT }
    }
}

/// Authorization server configuration.
#[derive(Debug, Clone)]
pub struct AuthServerConfig {
    /// Host put into `auth_host` when redirecting back to a client.
    pub public_host: String,

    /// Port put into `auth_port` when redirecting back to a client.
    pub public_port: u16,

    /// Access token lifetime.
    pub token_lifetime: Duration,

    /// Authorization code lifetime.
    pub code_lifetime: Duration,

    /// Secret of the registered `gossip_client`.
    pub client_secret: String,
}

impl AuthServerConfig {
    /// Create a configuration advertising the given location.
    #[must_use]
    pub fn new(public_host: impl Into<String>, public_port: u16) -> Self {
        Self {
            public_host: public_host.into(),
            public_port,
            token_lifetime: defaults::TOKEN_LIFETIME,
            code_lifetime: defaults::CODE_LIFETIME,
            client_secret: defaults::CLIENT_SECRET.to_string(),
        }
    }

    /// Override the access token lifetime.
    #[must_use]
    pub const fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Override the authorization code lifetime.
    #[must_use]
    pub const fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }

    /// Create a test configuration advertising `127.0.0.1:<port>`.
    #[must_use]
    pub fn for_testing(public_port: u16) -> Self {
        Self::new("127.0.0.1", public_port)
    }
}

impl Default for AuthServerConfig {
    fn default() -> Self {
        Self::new(defaults::HOST, defaults::AUTHSERVER_PORT)
    }
}

/// Resource server configuration.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Host of the authorization server (used for redirects and introspection).
    pub authserver_host: String,

    /// Port of the authorization server.
    pub authserver_port: u16,

    /// Introspection timeouts.
    pub timeouts: Timeouts,
}

impl ResourceConfig {
    /// Create a configuration pointing at the given authorization server.
    #[must_use]
    pub fn new(authserver_host: impl Into<String>, authserver_port: u16) -> Self {
        Self {
            authserver_host: authserver_host.into(),
            authserver_port,
            timeouts: Timeouts::default(),
        }
    }

    /// Create a test configuration pointing at a mock server base URL (`http://host:port`).
    ///
    /// # Panics
    ///
    /// Panics if `base_url` carries no host or port.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let url = url::Url::parse(base_url).expect("valid mock server url");
        Self {
            authserver_host: url.host_str().expect("mock server host").to_string(),
            authserver_port: url.port_or_known_default().expect("mock server port"),
            timeouts: Timeouts { request: Duration::from_secs(2), connect: Duration::from_secs(1) },
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self::new(defaults::HOST, defaults::AUTHSERVER_PORT)
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host the client advertises for its callback.
    pub host: String,

    /// Port the client advertises for its callback.
    pub port: u16,

    /// Host of the resource server.
    pub resource_host: String,

    /// Port of the resource server.
    pub resource_port: u16,

    /// Client identifier registered at the authorization server.
    pub client_id: String,

    /// Client secret registered at the authorization server.
    pub client_secret: String,

    /// Outbound timeouts.
    pub timeouts: Timeouts,

    /// How long a pending request waits for its callback.
    pub pending_ttl: Duration,
}

impl ClientConfig {
    /// Create a configuration with the registered `gossip_client` credentials.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        resource_host: impl Into<String>,
        resource_port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            resource_host: resource_host.into(),
            resource_port,
            client_id: defaults::CLIENT_ID.to_string(),
            client_secret: defaults::CLIENT_SECRET.to_string(),
            timeouts: Timeouts::default(),
            pending_ttl: defaults::PENDING_REQUEST_TTL,
        }
    }

    /// Override the client credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    /// Create a test configuration: the client lives on `127.0.0.1:<port>` and talks to a
    /// resource server at `resource_base_url`.
    ///
    /// # Panics
    ///
    /// Panics if `resource_base_url` carries no host or port.
    #[must_use]
    pub fn for_testing(port: u16, resource_base_url: &str) -> Self {
        let url = url::Url::parse(resource_base_url).expect("valid mock server url");
        let mut config = Self::new(
            "127.0.0.1",
            port,
            url.host_str().expect("mock server host"),
            url.port_or_known_default().expect("mock server port"),
        );
        config.timeouts = Timeouts { request: Duration::from_secs(2), connect: Duration::from_secs(1) };
        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(defaults::HOST, defaults::CLIENT_PORT, defaults::HOST, defaults::RESOURCE_PORT)
    }
}
