//! Redirecting session guard.
//!
//! The guard is fed every [`AuthState`] the identity provider publishes and
//! keeps protected views behind a signed-in user:
//!
//! ```text
//!            +---------+
//!   start -->| Loading |<------------------+
//!            +---------+                   |
//!             |       |                    |
//!             v       v                    |
//! +-----------------+   +---------------+  |
//! | Unauthenticated |<->| Authenticated |--+
//! +-----------------+   +---------------+
//! ```
//!
//! Entering `Unauthenticated` issues one "replace location" command to the
//! redirect target. `Loading` and `Authenticated` never redirect. The guard
//! does not remember redirects beyond the previous observation: a session that
//! resolves to a user after an earlier redirect is simply let through, and a
//! later sign-out redirects again.

use super::{AuthState, GuardState, SessionView};

/// Where unauthenticated visitors are sent unless configured otherwise.
pub const DEFAULT_REDIRECT_TARGET: &str = "/auth/login";

/// The navigation primitive the guard depends on.
///
/// `replace` must swap the current location instead of pushing a new history
/// entry, so "back" never returns to the protected view. Issuing the same
/// replace twice must be harmless.
pub trait Navigator {
    /// Replace the current location with `target`.
    fn replace(&mut self, target: &str);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn replace(&mut self, target: &str) {
        (**self).replace(target);
    }
}

/// Records every replace; handy for hosts that apply navigation later.
impl Navigator for Vec<String> {
    fn replace(&mut self, target: &str) {
        self.push(target.to_owned());
    }
}

/// Outcome of evaluating a single auth snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The provider is still resolving; render a placeholder, do not redirect.
    Wait,
    /// A user is present.
    Allow,
    /// No user; send the visitor to the redirect target.
    Redirect,
}

impl GuardDecision {
    /// Evaluate one snapshot with no memory of earlier ones.
    ///
    /// Request/response hosts (where every request carries a fully resolved
    /// session) use this directly.
    #[must_use]
    pub const fn evaluate<U>(state: &AuthState<U>) -> Self {
        match state.guard_state() {
            GuardState::Loading => Self::Wait,
            GuardState::Authenticated => Self::Allow,
            GuardState::Unauthenticated => Self::Redirect,
        }
    }
}

/// Observer that redirects when the observed session has no user.
#[derive(Debug)]
pub struct SessionGuard<N> {
    navigator: N,
    redirect_target: String,
    last: Option<GuardState>,
}

impl<N: Navigator> SessionGuard<N> {
    /// Create a guard redirecting to [`DEFAULT_REDIRECT_TARGET`].
    #[must_use]
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            redirect_target: DEFAULT_REDIRECT_TARGET.to_owned(),
            last: None,
        }
    }

    /// Override the redirect target.
    #[must_use]
    pub fn with_redirect_target(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = target.into();
        self
    }

    /// The configured redirect target.
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        &self.redirect_target
    }

    /// State seen on the previous observation, `None` before the first one.
    #[must_use]
    pub const fn last_state(&self) -> Option<GuardState> {
        self.last
    }

    /// Observe a new snapshot from the auth source.
    ///
    /// Issues the redirect when the snapshot enters the unauthenticated state;
    /// re-observing an unchanged unauthenticated snapshot does not redirect a
    /// second time.
    pub fn observe<U: Clone>(&mut self, state: &AuthState<U>) -> SessionView<U> {
        let current = state.guard_state();

        let entered = self.last != Some(current);
        if entered && GuardDecision::evaluate(state) == GuardDecision::Redirect {
            self.navigator.replace(&self.redirect_target);
        }

        self.last = Some(current);
        SessionView::from(state)
    }

    /// Borrow the navigator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Consume the guard, returning its navigator.
    #[must_use]
    pub fn into_navigator(self) -> N {
        self.navigator
    }
}
