//! Authentication state as seen by protected views.
//!
//! The identity provider owns the session; this module only describes the
//! snapshot it publishes ([`AuthState`]) and the simplified view handed to
//! callers ([`SessionView`]). The [`guard`] submodule turns a stream of
//! snapshots into redirects.

pub mod guard;

use serde::{Deserialize, Serialize};

use crate::types::{SubscriptionPlan, UserId};

pub use guard::{DEFAULT_REDIRECT_TARGET, GuardDecision, Navigator, SessionGuard};

/// Signed-in user as reported by the identity provider.
///
/// Only presence matters to the guard; the fields are carried through for
/// handlers that need to know who is asking. The plan comes from billing
/// alongside the identity and is never taken from request input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Provider-assigned user ID.
    pub id: UserId,
    /// Email address, when the provider shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Subscription tier on record for this merchant.
    pub plan: SubscriptionPlan,
}

/// Snapshot of the external auth source.
///
/// While `loading` is `true` the `user` field is not authoritative: the
/// provider has not finished restoring the session yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState<U = UserIdentity> {
    /// The signed-in user, if any.
    pub user: Option<U>,
    /// Whether the provider is still resolving the session.
    pub loading: bool,
}

impl<U> AuthState<U> {
    /// The provider is still resolving the session.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// The provider has resolved and nobody is signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    /// The provider has resolved to `user`.
    #[must_use]
    pub const fn authenticated(user: U) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    /// Classify the snapshot.
    #[must_use]
    pub const fn guard_state(&self) -> GuardState {
        match (self.loading, &self.user) {
            (true, _) => GuardState::Loading,
            (false, None) => GuardState::Unauthenticated,
            (false, Some(_)) => GuardState::Authenticated,
        }
    }
}

impl<U> Default for AuthState<U> {
    /// Nothing has been published yet, so the session is still loading.
    fn default() -> Self {
        Self::loading()
    }
}

/// The three states a protected view can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Session still resolving; never redirect.
    Loading,
    /// Resolved with no user; redirect away.
    Unauthenticated,
    /// Resolved with a user; render.
    Authenticated,
}

/// What a protected view gets back from the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView<U = UserIdentity> {
    /// The signed-in user, if any.
    pub user: Option<U>,
    /// Whether the provider is still resolving the session.
    pub loading: bool,
    /// `true` iff `user` is present.
    pub is_authenticated: bool,
}

impl<U: Clone> From<&AuthState<U>> for SessionView<U> {
    fn from(state: &AuthState<U>) -> Self {
        Self {
            user: state.user.clone(),
            loading: state.loading,
            is_authenticated: state.user.is_some(),
        }
    }
}

impl<U> From<AuthState<U>> for SessionView<U> {
    fn from(state: AuthState<U>) -> Self {
        let is_authenticated = state.user.is_some();
        Self {
            user: state.user,
            loading: state.loading,
            is_authenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_state_classification() {
        assert_eq!(AuthState::<u32>::loading().guard_state(), GuardState::Loading);
        assert_eq!(
            AuthState::<u32>::anonymous().guard_state(),
            GuardState::Unauthenticated
        );
        assert_eq!(
            AuthState::authenticated(7_u32).guard_state(),
            GuardState::Authenticated
        );
    }

    #[test]
    fn test_loading_with_stale_user_is_loading() {
        let state = AuthState {
            user: Some(7_u32),
            loading: true,
        };
        assert_eq!(state.guard_state(), GuardState::Loading);
    }

    #[test]
    fn test_default_is_loading() {
        assert_eq!(AuthState::<u32>::default(), AuthState::loading());
    }

    #[test]
    fn test_view_derives_is_authenticated() {
        let view = SessionView::from(&AuthState::authenticated("alice"));
        assert!(view.is_authenticated);
        assert_eq!(view.user, Some("alice"));

        let view = SessionView::from(AuthState::<&str>::anonymous());
        assert!(!view.is_authenticated);
        assert!(!view.loading);
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = SessionView::from(AuthState::<String>::loading());
        let json = serde_json::to_value(view).unwrap_or_default();
        assert_eq!(json["isAuthenticated"], false);
        assert_eq!(json["loading"], true);
        assert!(json["user"].is_null());
    }
}
