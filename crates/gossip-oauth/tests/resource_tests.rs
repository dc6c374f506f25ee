//! Resource server tests against a wiremock authorization server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gossip_oauth::config::ResourceConfig;
use gossip_oauth::error::{UpstreamError, UpstreamResult};
use gossip_oauth::resource::{GossipCatalog, Introspector, ResourceState, create_app, create_router};
use gossip_oauth::urls::service_base;

const CLIENT_QUERY: &str = "host=localhost&port=1234&client_id=gossip_client&state=abc123";

fn build_router(mock_server: &MockServer) -> axum::Router {
    create_app(&ResourceConfig::for_testing(&mock_server.uri())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Without a token
// =============================================================================

#[tokio::test]
async fn test_redirects_to_authorization_server() {
    let mock_server = MockServer::start().await;
    let app = build_router(&mock_server);

    let response = app.oneshot(get(&format!("/gossip/alice?{CLIENT_QUERY}"), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "bearer");

    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    let url = url::Url::parse(location).unwrap();
    let auth_base = url::Url::parse(&mock_server.uri()).unwrap();
    assert_eq!(url.host_str(), auth_base.host_str());
    assert_eq!(url.port(), auth_base.port());
    assert_eq!(url.path(), "/authorization");

    let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs["callback_url"], "http://localhost:1234/callback/alice?state=abc123");
    assert_eq!(pairs["client_id"], "gossip_client");
}

#[tokio::test]
async fn test_redirect_does_not_call_authorization_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accesscheck"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = build_router(&mock_server)
        .oneshot(get(&format!("/gossip/bob?{CLIENT_QUERY}"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_missing_client_parameters() {
    let mock_server = MockServer::start().await;

    for query in [
        "port=1234&client_id=gossip_client&state=s",
        "host=localhost&client_id=gossip_client&state=s",
        "host=localhost&port=1234&state=s",
        "host=localhost&port=1234&client_id=gossip_client",
    ] {
        let response = build_router(&mock_server)
            .oneshot(get(&format!("/gossip/alice?{query}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query:?}");
    }
}

#[tokio::test]
async fn test_invalid_client_port() {
    let mock_server = MockServer::start().await;

    let response = build_router(&mock_server)
        .oneshot(get("/gossip/alice?host=localhost&port=http&client_id=c&state=s", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_scope_not_found() {
    let mock_server = MockServer::start().await;

    let response = build_router(&mock_server)
        .oneshot(get(&format!("/gossip/eve?{CLIENT_QUERY}"), Some("anything")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// With a token
// =============================================================================

#[tokio::test]
async fn test_valid_token_returns_items() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accesscheck"))
        .and(body_string_contains("access_token=tok123"))
        .and(body_string_contains("scope=alice"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response =
        build_router(&mock_server).oneshot(get("/gossip/alice", Some("tok123"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let items: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(items, ["Oreos are made out of sand.", "Bob stinks."]);
}

#[tokio::test]
async fn test_rejected_token_forbidden() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accesscheck"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let response =
        build_router(&mock_server).oneshot(get("/gossip/alice", Some("stale"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_introspection_server_error_denies() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accesscheck"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let response =
        build_router(&mock_server).oneshot(get("/gossip/alice", Some("tok"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unreachable_authorization_server_denies() {
    // Nothing listens once the mock server is dropped.
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };
    let app = create_app(&ResourceConfig::for_testing(&uri)).unwrap();

    let response = app.oneshot(get("/gossip/alice", Some("tok"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_slow_authorization_server_denies() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accesscheck"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&mock_server)
        .await;
    let config = ResourceConfig::for_testing(&mock_server.uri());
    assert!(config.timeouts.request < Duration::from_secs(3));

    let response =
        create_app(&config).unwrap().oneshot(get("/gossip/alice", Some("tok"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Introspector seam
// =============================================================================

struct AllowOnly(&'static str);

#[async_trait]
impl Introspector for AllowOnly {
    async fn check(&self, access_token: &str, _scope: &str) -> UpstreamResult<()> {
        if access_token == self.0 {
            Ok(())
        } else {
            Err(UpstreamError::unexpected_status("/accesscheck", 403))
        }
    }
}

#[tokio::test]
async fn test_custom_introspector() {
    let state = Arc::new(ResourceState {
        catalog: GossipCatalog::seeded(),
        auth_base: service_base("localhost", 8443).unwrap(),
        introspector: Arc::new(AllowOnly("good")),
    });

    let response =
        create_router(state.clone()).oneshot(get("/gossip/bob", Some("good"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let items: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(items[1], "Alice has a crush on me.");

    let response = create_router(state).oneshot(get("/gossip/bob", Some("bad"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health() {
    let mock_server = MockServer::start().await;

    let response =
        build_router(&mock_server).oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
