//! End-to-end tests for the session guard.

use marketplace_integration_tests::{IDENTITY_SECRET, TestServer};
use reqwest::{StatusCode, header::LOCATION};
use serde_json::{Value, json};

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await;
    let resp = TestServer::client()
        .get(server.url("/health"))
        .send()
        .await
        .expect("Failed to get health");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
async fn test_signed_out_dashboard_redirects_to_login() {
    let server = TestServer::spawn().await;
    let resp = TestServer::client()
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("/auth/login")
    );
}

#[tokio::test]
async fn test_redirect_uses_configured_login_path() {
    let server = TestServer::spawn_with_login_path("/signin").await;
    let resp = TestServer::client()
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(
        resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("/signin")
    );
}

#[tokio::test]
async fn test_signed_in_dashboard_returns_session_view() {
    let server = TestServer::spawn().await;
    let client = TestServer::client();
    let user_id = server.sign_in(&client).await;

    let resp = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    let view: Value = resp.json().await.expect("Failed to parse session view");
    assert_eq!(view["isAuthenticated"], true);
    assert_eq!(view["loading"], false);
    assert_eq!(view["user"]["id"], user_id.to_string());
    assert_eq!(view["user"]["email"], "merchant@example.com");
    assert_eq!(view["user"]["plan"], "free");
}

#[tokio::test]
async fn test_identity_hand_over_requires_provider_secret() {
    let server = TestServer::spawn().await;
    let client = TestServer::client();
    let identity = json!({
        "user_id": "11111111-2222-3333-4444-555555555555",
        "plan": "pro",
    });

    let missing = client
        .post(server.url("/auth/session"))
        .json(&identity)
        .send()
        .await
        .expect("Failed to post session");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = client
        .post(server.url("/auth/session"))
        .bearer_auth(IDENTITY_SECRET.to_lowercase())
        .json(&identity)
        .send()
        .await
        .expect("Failed to post session");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    // Neither attempt signed the client in.
    let resp = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_sign_in_after_redirect_is_let_through() {
    let server = TestServer::spawn().await;
    let client = TestServer::client();

    let first = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    server.sign_in(&client).await;

    let second = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(second.status(), StatusCode::OK);
    assert!(second.headers().get(LOCATION).is_none());
}

#[tokio::test]
async fn test_logout_then_dashboard_redirects_again() {
    let server = TestServer::spawn().await;
    let client = TestServer::client();
    server.sign_in(&client).await;

    let resp = client
        .post(server.url("/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_session_api_never_rejects() {
    let server = TestServer::spawn().await;
    let client = TestServer::client();

    let view: Value = client
        .get(server.url("/api/session"))
        .send()
        .await
        .expect("Failed to get session")
        .json()
        .await
        .expect("Failed to parse session view");
    assert_eq!(view["isAuthenticated"], false);
    assert!(view["user"].is_null());

    server.sign_in(&client).await;

    let view: Value = client
        .get(server.url("/api/session"))
        .send()
        .await
        .expect("Failed to get session")
        .json()
        .await
        .expect("Failed to parse session view");
    assert_eq!(view["isAuthenticated"], true);
}

#[tokio::test]
async fn test_forged_cookie_is_signed_out() {
    let server = TestServer::spawn().await;
    let resp = TestServer::client()
        .get(server.url("/dashboard"))
        .header("cookie", "mp_session=not-a-real-session")
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::spawn().await;
    let resp = TestServer::client()
        .get(server.url("/health"))
        .header("x-request-id", "req-123")
        .send()
        .await
        .expect("Failed to get health");

    assert_eq!(
        resp.headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
}
