//! Integration tests for the marketplace web service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! Each test starts the real router on an ephemeral localhost port with
//! [`TestServer::spawn`] and talks to it over HTTP, cookies and all. No
//! external services are needed: the identity provider is stood in for by
//! posting identities to `/auth/session` with [`IDENTITY_SECRET`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{Ipv4Addr, SocketAddr};

use marketplace_core::SubscriptionPlan;
use marketplace_web::config::{SentryConfig, WebConfig};
use marketplace_web::state::AppState;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

/// Bearer secret the test servers expect from the identity provider.
pub const IDENTITY_SECRET: &str = "Xq8vN2rT5kLp9wZc3mHs7bGd1yFj4aUe";

/// A running in-process server.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Start the server with the default login path.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        Self::spawn_with_login_path(marketplace_core::DEFAULT_REDIRECT_TARGET).await
    }

    /// Start the server redirecting signed-out visitors to `login_path`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn_with_login_path(login_path: &str) -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let config = WebConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}")
                .parse()
                .expect("Failed to parse base URL"),
            login_path: login_path.to_string(),
            identity_secret: SecretString::from(IDENTITY_SECRET),
            session_capacity: 1_000,
            sentry: SentryConfig::default(),
        };
        let app = marketplace_web::app(AppState::new(config));

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self { addr }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A client that keeps cookies and does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Sign `client` in as a fresh free-plan user, returning the user ID.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be established.
    pub async fn sign_in(&self, client: &Client) -> Uuid {
        self.sign_in_as(client, SubscriptionPlan::Free).await
    }

    /// Sign `client` in as a fresh user on `plan`, returning the user ID.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be established.
    pub async fn sign_in_as(&self, client: &Client, plan: SubscriptionPlan) -> Uuid {
        let user_id = Uuid::new_v4();
        let resp = client
            .post(self.url("/auth/session"))
            .bearer_auth(IDENTITY_SECRET)
            .json(&json!({
                "user_id": user_id,
                "email": "merchant@example.com",
                "plan": plan,
            }))
            .send()
            .await
            .expect("Failed to post session");
        assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);
        user_id
    }
}
