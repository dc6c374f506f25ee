//! In-memory credential & grant store owned by the authorization server.
//!
//! Every registry sits behind its own `RwLock`. Code redemption takes the code lock for writing
//! and the consent lock for reading, in that order, so a code is redeemed at most once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::defaults;
use crate::token::{ACCESS_TOKEN_BYTES, CODE_BYTES, random_token};

/// An authorization code waiting to be redeemed.
struct AuthCode {
    username: String,
    issued_at: Instant,
}

/// An issued access token.
struct IssuedToken {
    scope: String,
    expires_at: Instant,
}

impl IssuedToken {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Why a code could not be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemError {
    /// Never issued, already redeemed or past its lifetime.
    UnknownCode,
    /// The code's owner has not authorized the requesting client.
    NotAuthorized,
}

/// Why introspection rejected a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrospectionError {
    UnknownToken,
    ScopeMismatch,
    Expired,
}

/// A freshly minted access token.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub access_token: String,
    pub scope: String,
    pub expires_in: Duration,
}

/// In-memory OAuth state store.
#[derive(Clone)]
pub struct GrantStore {
    clients: Arc<HashMap<String, String>>,
    users: Arc<HashMap<String, String>>,
    consents: Arc<RwLock<HashMap<String, HashSet<String>>>>,
    codes: Arc<RwLock<HashMap<String, AuthCode>>>,
    tokens: Arc<RwLock<HashMap<String, IssuedToken>>>,
    token_lifetime: Duration,
    code_lifetime: Duration,
}

impl GrantStore {
    /// Create a store over static client (`id -> secret`) and user (`name -> password`)
    /// registries.
    #[must_use]
    pub fn new(
        clients: HashMap<String, String>,
        users: HashMap<String, String>,
        token_lifetime: Duration,
        code_lifetime: Duration,
    ) -> Self {
        let consents = users.keys().map(|u| (u.clone(), HashSet::new())).collect();
        Self {
            clients: Arc::new(clients),
            users: Arc::new(users),
            consents: Arc::new(RwLock::new(consents)),
            codes: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(HashMap::new())),
            token_lifetime,
            code_lifetime,
        }
    }

    /// The demo registries: `gossip_client` plus users alice, bob and mallory.
    #[must_use]
    pub fn seeded(client_secret: &str, token_lifetime: Duration, code_lifetime: Duration) -> Self {
        let clients = HashMap::from([(defaults::CLIENT_ID.to_string(), client_secret.to_string())]);
        let users = HashMap::from([
            ("alice".to_string(), "topsecret".to_string()),
            ("bob".to_string(), "1234".to_string()),
            ("mallory".to_string(), "70p53cr37".to_string()),
        ]);
        Self::new(clients, users, token_lifetime, code_lifetime)
    }

    /// Check a user's password.
    #[must_use]
    pub fn verify_user(&self, username: &str, password: &str) -> bool {
        self.users.get(username).is_some_and(|real| real == password)
    }

    /// Whether a client identifier is registered. The secret is not looked at.
    #[must_use]
    pub fn is_registered_client(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Check a client's secret.
    #[must_use]
    pub fn verify_client(&self, client_id: &str, client_secret: &str) -> bool {
        self.clients.get(client_id).is_some_and(|real| real == client_secret)
    }

    /// Record that `username` authorized `client_id`.
    pub async fn grant_consent(&self, username: &str, client_id: &str) {
        self.consents
            .write()
            .await
            .entry(username.to_owned())
            .or_default()
            .insert(client_id.to_owned());
    }

    /// Withdraw a consent. Returns whether one existed.
    pub async fn revoke_consent(&self, username: &str, client_id: &str) -> bool {
        self.consents
            .write()
            .await
            .get_mut(username)
            .is_some_and(|clients| clients.remove(client_id))
    }

    /// Whether `username` has authorized `client_id`.
    pub async fn has_consent(&self, username: &str, client_id: &str) -> bool {
        self.consents
            .read()
            .await
            .get(username)
            .is_some_and(|clients| clients.contains(client_id))
    }

    /// Mint a single-use authorization code for `username`.
    pub async fn issue_code(&self, username: &str) -> String {
        let code = random_token(CODE_BYTES);
        self.codes.write().await.insert(
            code.clone(),
            AuthCode { username: username.to_owned(), issued_at: Instant::now() },
        );
        code
    }

    /// Redeem a code on behalf of `client_id`.
    ///
    /// On success the code is gone and the owning username is returned. A code whose owner has
    /// not authorized the client stays redeemable for when consent is recorded.
    pub async fn redeem_code(&self, code: &str, client_id: &str) -> Result<String, RedeemError> {
        let mut codes = self.codes.write().await;
        let Some(auth_code) = codes.get(code) else {
            return Err(RedeemError::UnknownCode);
        };

        if auth_code.issued_at.elapsed() >= self.code_lifetime {
            codes.remove(code);
            return Err(RedeemError::UnknownCode);
        }

        let authorized = self
            .consents
            .read()
            .await
            .get(&auth_code.username)
            .is_some_and(|clients| clients.contains(client_id));
        if !authorized {
            return Err(RedeemError::NotAuthorized);
        }

        codes.remove(code).map(|c| c.username).ok_or(RedeemError::UnknownCode)
    }

    /// Mint an access token scoped to `username`.
    pub async fn issue_token(&self, username: &str) -> IssuedAccessToken {
        let access_token = random_token(ACCESS_TOKEN_BYTES);
        self.tokens.write().await.insert(
            access_token.clone(),
            IssuedToken {
                scope: username.to_owned(),
                expires_at: Instant::now() + self.token_lifetime,
            },
        );
        IssuedAccessToken {
            access_token,
            scope: username.to_owned(),
            expires_in: self.token_lifetime,
        }
    }

    /// Validate a token for `scope`. Expiry is decided here, at lookup time.
    pub async fn introspect(&self, access_token: &str, scope: &str) -> Result<(), IntrospectionError> {
        let tokens = self.tokens.read().await;
        let token = tokens.get(access_token).ok_or(IntrospectionError::UnknownToken)?;
        if token.scope != scope {
            return Err(IntrospectionError::ScopeMismatch);
        }
        if token.is_expired(Instant::now()) {
            return Err(IntrospectionError::Expired);
        }
        Ok(())
    }

    /// Start background cleanup task for expired tokens and codes.
    pub fn start_cleanup_task(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(defaults::CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                store.cleanup_expired().await;
            }
        });
    }

    /// Drop codes past their lifetime and tokens past expiry.
    pub async fn cleanup_expired(&self) {
        let now = Instant::now();

        {
            let mut codes = self.codes.write().await;
            let before = codes.len();
            codes.retain(|_, code| now.duration_since(code.issued_at) < self.code_lifetime);
            let removed = before - codes.len();
            if removed > 0 {
                tracing::debug!(count = removed, "Cleaned up expired authorization codes");
            }
        }

        {
            let mut tokens = self.tokens.write().await;
            let before = tokens.len();
            tokens.retain(|_, token| !token.is_expired(now));
            let removed = before - tokens.len();
            if removed > 0 {
                tracing::debug!(count = removed, "Cleaned up expired access tokens");
            }
        }
    }

    /// Number of codes not yet redeemed.
    pub async fn outstanding_codes(&self) -> usize {
        self.codes.read().await.len()
    }

    /// Number of live token entries (expired ones count until swept).
    pub async fn issued_tokens(&self) -> usize {
        self.tokens.read().await.len()
    }
}

impl std::fmt::Debug for GrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantStore")
            .field("clients", &self.clients.len())
            .field("users", &self.users.len())
            .field("token_lifetime", &self.token_lifetime)
            .finish()
    }
}
