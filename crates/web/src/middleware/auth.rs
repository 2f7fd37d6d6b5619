//! Session guard extractors.
//!
//! Every request carries a fully resolved session (the cookie either maps to a
//! stored identity or it does not), so handlers evaluate the core
//! [`GuardDecision`] once per request instead of running a long-lived guard.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use marketplace_core::{AuthState, GuardDecision, SessionView};
use secrecy::ExposeSecret;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Page requests without a user are redirected to the configured login path
/// with `303 See Other`, which replaces the protected URL instead of adding
/// it to history. API requests (`/api/...`) get `401` instead.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireSession(user): RequireSession) -> impl IntoResponse {
///     format!("Hello, {}!", user.id)
/// }
/// ```
pub struct RequireSession(pub CurrentUser);

/// Extractor exposing the session view without rejecting the request.
pub struct SessionContext(pub SessionView<CurrentUser>);

/// Extractor proving the request comes from the identity provider.
///
/// The provider authenticates with `Authorization: Bearer <secret>`, where the
/// secret is `MARKETPLACE_IDENTITY_SECRET`. Anything else is rejected with
/// `401`.
pub struct VerifiedProvider;

/// Rejection returned by [`RequireSession`].
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Replace the current location with the login path (page requests).
    RedirectToLogin(String),
    /// Unauthorized response (API requests).
    Unauthorized,
    /// The auth source has not resolved yet.
    Pending,
}

impl AuthRejection {
    /// Pick the rejection for a signed-out request to `path`.
    #[must_use]
    pub fn for_path(path: &str, login_path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin(login_path.to_owned())
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(target) => Redirect::to(&target).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Pending => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = load_auth_state(parts).await;

        match GuardDecision::evaluate(&auth) {
            GuardDecision::Allow => auth.user.map(Self).ok_or(AuthRejection::Unauthorized),
            GuardDecision::Wait => Err(AuthRejection::Pending),
            GuardDecision::Redirect => {
                // Nested routers strip their prefix from `parts.uri`.
                let path = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map_or_else(|| parts.uri.path(), |uri| uri.path());
                let rejection = AuthRejection::for_path(path, state.login_path());
                tracing::debug!(
                    path,
                    rejection = ?rejection,
                    "Session guard rejected signed-out request"
                );
                Err(rejection)
            }
        }
    }
}

impl FromRequestParts<AppState> for VerifiedProvider {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let expected = state.config().identity_secret.expose_secret();
        match presented {
            Some(token) if secrets_match(token.as_bytes(), expected.as_bytes()) => Ok(Self),
            _ => {
                tracing::warn!("Rejected identity hand-over without valid provider credentials");
                Err(AuthRejection::Unauthorized)
            }
        }
    }
}

/// Compare two secrets without short-circuiting on the first differing byte.
fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(SessionView::from(load_auth_state(parts).await)))
    }
}

/// Read the auth snapshot for this request from the session.
///
/// A missing session layer, an empty session or an unreadable entry all count
/// as signed out; nothing is ever treated as authenticated by default.
pub async fn load_auth_state(parts: &Parts) -> AuthState<CurrentUser> {
    let Some(session) = parts.extensions.get::<Session>().cloned() else {
        return AuthState::anonymous();
    };

    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(Some(user)) => AuthState::authenticated(user),
        Ok(None) => AuthState::anonymous(),
        Err(err) => {
            tracing::warn!(error = %err, "Unreadable session entry; treating as signed out");
            AuthState::anonymous()
        }
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user and the rest of the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_pages_redirect_to_login() {
        assert_eq!(
            AuthRejection::for_path("/dashboard", "/auth/login"),
            AuthRejection::RedirectToLogin("/auth/login".to_string())
        );
    }

    #[test]
    fn test_api_requests_get_unauthorized() {
        assert_eq!(
            AuthRejection::for_path("/api/checkout/complete", "/auth/login"),
            AuthRejection::Unauthorized
        );
    }

    #[test]
    fn test_redirect_replaces_location() {
        let response = AuthRejection::RedirectToLogin("/signin".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).map(|v| v.as_bytes()),
            Some(&b"/signin"[..])
        );
    }

    #[test]
    fn test_pending_does_not_redirect() {
        let response = AuthRejection::Pending.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match(b"s3cr3t-value", b"s3cr3t-value"));
        assert!(!secrets_match(b"s3cr3t-valuE", b"s3cr3t-value"));
        assert!(!secrets_match(b"s3cr3t", b"s3cr3t-value"));
        assert!(!secrets_match(b"", b"s3cr3t-value"));
    }

    #[tokio::test]
    async fn test_no_session_layer_is_anonymous() {
        let (parts, ()) = axum::http::Request::new(()).into_parts();
        assert_eq!(load_auth_state(&parts).await, AuthState::anonymous());
    }
}
