//! All three services on real sockets, with a non-redirecting reqwest client playing the
//! browser.

use std::collections::HashMap;

use axum::Router;
use reqwest::{StatusCode, header, redirect};
use tokio::net::TcpListener;

use gossip_oauth::config::{AuthServerConfig, ClientConfig, ResourceConfig};
use gossip_oauth::{authserver, client, resource};

struct Deployment {
    client_base: String,
    browser: reqwest::Client,
}

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

async fn deploy() -> Deployment {
    let (auth_listener, auth_port) = bind().await;
    let (resource_listener, resource_port) = bind().await;
    let (client_listener, client_port) = bind().await;

    spawn(auth_listener, authserver::create_app(AuthServerConfig::for_testing(auth_port)));
    spawn(
        resource_listener,
        resource::create_app(&ResourceConfig::new("127.0.0.1", auth_port)).unwrap(),
    );
    spawn(
        client_listener,
        client::create_app(&ClientConfig::new("127.0.0.1", client_port, "127.0.0.1", resource_port))
            .unwrap(),
    );

    let browser = reqwest::Client::builder().redirect(redirect::Policy::none()).build().unwrap();
    Deployment { client_base: format!("http://127.0.0.1:{client_port}"), browser }
}

fn location(response: &reqwest::Response) -> String {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string()
}

impl Deployment {
    async fn request_gossip(&self, username: &str) -> reqwest::Response {
        self.browser
            .get(format!("{}/gossip", self.client_base))
            .query(&[("username", username)])
            .send()
            .await
            .unwrap()
    }

    /// Follow the client's redirect to the login form and submit it. Returns the response of
    /// the form submission.
    async fn log_in(&self, redirect: &str, username: &str, password: &str) -> reqwest::Response {
        let form_page = self.browser.get(redirect).send().await.unwrap();
        assert_eq!(form_page.status(), StatusCode::OK);
        let html = form_page.text().await.unwrap();
        assert!(html.contains(r#"name="password""#));

        let url = url::Url::parse(redirect).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        let mut action = url.clone();
        action.set_query(None);

        self.browser
            .post(action)
            .form(&[
                ("username", username),
                ("password", password),
                ("client_id", pairs["client_id"].as_str()),
                ("callback_url", pairs["callback_url"].as_str()),
            ])
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_alice_reads_her_gossip() {
    let deployment = deploy().await;

    let response = deployment.request_gossip("alice").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let to_login = location(&response);
    assert!(to_login.contains("/authorization?callback_url="));

    let response = deployment.log_in(&to_login, "alice", "topsecret").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let to_callback = location(&response);
    assert!(to_callback.starts_with(&format!("{}/callback/alice?", deployment.client_base)));
    assert!(to_callback.contains("auth_code="));

    let response = deployment.browser.get(&to_callback).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Oreos are made out of sand."));
    assert!(html.contains("Bob stinks."));

    // The cached token is still valid: no redirect this time.
    let response = deployment.request_gossip("alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Bob stinks."));

    // Replaying the callback finds no pending state.
    let response = deployment.browser.get(&to_callback).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_password_stops_the_flow() {
    let deployment = deploy().await;

    let response = deployment.request_gossip("alice").await;
    let to_login = location(&response);

    let response = deployment.log_in(&to_login, "alice", "wrongpass").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_someone_elses_login_does_not_grant_access() {
    let deployment = deploy().await;

    let response = deployment.request_gossip("alice").await;
    let to_login = location(&response);

    // Mallory completes the login form of a flow started for alice.
    let response = deployment.log_in(&to_login, "mallory", "70p53cr37").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = deployment.browser.get(location(&response)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await.unwrap();
    assert!(!body.contains("Oreos"));
}

#[tokio::test]
async fn test_unknown_user_resource() {
    let deployment = deploy().await;

    let response = deployment.request_gossip("eve").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
