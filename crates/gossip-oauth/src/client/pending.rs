//! Client-side correlation state: pending requests keyed by `state`, and cached access tokens
//! keyed by username.

use std::time::Duration;

use moka::future::Cache;

use crate::config::defaults;
use crate::flow::Flow;
use crate::token::{STATE_BYTES, random_token};

/// Outstanding redirects waiting for their callback.
#[derive(Clone)]
pub struct PendingRequests {
    flows: Cache<String, Flow>,
}

impl PendingRequests {
    /// Pending requests are forgotten after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { flows: Cache::builder().time_to_live(ttl).build() }
    }

    /// Start a flow for `username` under a fresh random `state`.
    pub async fn begin(&self, username: &str) -> String {
        let state = random_token(STATE_BYTES);
        self.flows.insert(state.clone(), Flow::awaiting_login(state.clone(), username)).await;
        state
    }

    /// Consume the flow registered under `state`. Each state is handed out at most once.
    pub async fn take(&self, state: &str) -> Option<Flow> {
        self.flows.remove(state).await
    }

    /// Forget a state whose request finished without a redirect.
    pub async fn discard(&self, state: &str) {
        self.flows.invalidate(state).await;
    }

    #[must_use]
    pub fn contains(&self, state: &str) -> bool {
        self.flows.contains_key(state)
    }
}

impl std::fmt::Debug for PendingRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequests").field("entries", &self.flows.entry_count()).finish()
    }
}

/// Access tokens obtained per username.
#[derive(Clone)]
pub struct TokenCache {
    tokens: Cache<String, String>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self { tokens: Cache::builder().max_capacity(defaults::TOKEN_CACHE_MAX_SIZE).build() }
    }

    pub async fn get(&self, username: &str) -> Option<String> {
        self.tokens.get(username).await
    }

    pub async fn insert(&self, username: &str, access_token: String) {
        self.tokens.insert(username.to_owned(), access_token).await;
    }

    pub async fn evict(&self, username: &str) {
        self.tokens.invalidate(username).await;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache").field("entries", &self.tokens.entry_count()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowPhase;

    #[tokio::test]
    async fn test_state_is_single_use() {
        let pending = PendingRequests::new(Duration::from_secs(60));
        let state = pending.begin("alice").await;
        assert!(pending.contains(&state));

        let flow = pending.take(&state).await.unwrap();
        assert_eq!(flow.username, "alice");
        assert_eq!(flow.state, state);
        assert_eq!(flow.phase(), FlowPhase::AwaitingLogin);

        assert!(pending.take(&state).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_state() {
        let pending = PendingRequests::new(Duration::from_secs(60));
        assert!(pending.take("forged").await.is_none());
    }

    #[tokio::test]
    async fn test_discard() {
        let pending = PendingRequests::new(Duration::from_secs(60));
        let state = pending.begin("bob").await;
        pending.discard(&state).await;
        assert!(pending.take(&state).await.is_none());
    }

    #[tokio::test]
    async fn test_states_are_distinct() {
        let pending = PendingRequests::new(Duration::from_secs(60));
        let a = pending.begin("alice").await;
        let b = pending.begin("alice").await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_concurrent_take_has_one_winner() {
        let pending = PendingRequests::new(Duration::from_secs(60));
        let state = pending.begin("alice").await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pending = pending.clone();
                let state = state.clone();
                tokio::spawn(async move { pending.take(&state).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_token_cache() {
        let tokens = TokenCache::new();
        assert!(tokens.get("alice").await.is_none());
        tokens.insert("alice", "tok".into()).await;
        assert_eq!(tokens.get("alice").await.as_deref(), Some("tok"));
        tokens.evict("alice").await;
        assert!(tokens.get("alice").await.is_none());
    }
}
