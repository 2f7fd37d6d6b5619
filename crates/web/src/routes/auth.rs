//! Authentication route handlers.
//!
//! The hosted identity provider does the actual sign-in. Once it has resolved
//! a user it posts the identity, together with the merchant's billing plan, to
//! `/auth/session` using its bearer secret; the identity is stored in the
//! session the guard reads from. Posts without the secret are rejected.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use marketplace_core::{SubscriptionPlan, UserId};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{VerifiedProvider, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Identity handed over by the provider.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: UserId,
    pub email: Option<String>,
    /// Plan on record with billing; fixes the commission rate for the session.
    pub plan: SubscriptionPlan,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Display the login landing page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    let notice = if query.error.is_some() {
        "<p role=\"alert\">Sign-in failed, please try again.</p>"
    } else {
        ""
    };

    Html(format!(
        "<!doctype html><title>Sign in</title><h1>Sign in</h1>{notice}\
         <p>Continue with your account provider to reach your dashboard.</p>"
    ))
}

/// Store the provider-resolved identity in the session.
pub async fn create_session(
    _provider: VerifiedProvider,
    session: Session,
    Json(request): Json<SessionRequest>,
) -> Result<StatusCode> {
    let user = CurrentUser {
        id: request.user_id,
        email: request.email.filter(|email| !email.is_empty()),
        plan: request.plan,
    };

    // New identity, new session ID
    session.cycle_id().await?;
    set_current_user(&session, &user).await?;

    set_sentry_user(&user.id, user.email.as_deref());
    tracing::info!(user_id = %user.id, plan = %user.plan, "Session established");

    Ok(StatusCode::NO_CONTENT)
}

/// Sign out and go back to the login page.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!("Session cleared");

    Ok(Redirect::to(state.login_path()))
}
