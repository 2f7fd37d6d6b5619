//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//!
//! # Auth (identity provider bridge)
//! GET  /auth/login              - Login landing page (guard redirect target)
//! POST /auth/session            - Store the identity the provider resolved (provider bearer secret)
//! POST /auth/logout             - Sign out
//!
//! # Protected pages (session guard redirects when signed out)
//! GET  /dashboard               - Current session view
//!
//! # API
//! GET  /api/session             - Session view, never rejects
//! GET  /api/commission/rates    - Commission rate per plan
//! POST /api/commission/quote    - Commission/payout for an amount and plan
//! POST /api/checkout/complete   - Settle a checkout at the session's plan rate (401 when signed out)
//! ```

pub mod auth;
pub mod checkout;
pub mod commission;
pub mod dashboard;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/session", post(auth::create_session))
        .route("/logout", post(auth::logout))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(dashboard::session))
        .route("/commission/rates", get(commission::rates))
        .route("/commission/quote", post(commission::quote))
        .route("/checkout/complete", post(checkout::complete))
}

/// Create all routes for the service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard::show))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
