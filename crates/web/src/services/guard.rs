//! Reactive session guard runner.
//!
//! Hosts that receive auth updates as a stream (a provider SDK callback, a
//! websocket push, a token refresher) publish them into a
//! [`tokio::sync::watch`] channel. [`spawn_session_guard`] re-runs the core
//! [`SessionGuard`] on every published snapshot, republishes the resulting
//! [`SessionView`] and forwards redirect commands over an `mpsc` channel.
//!
//! `watch` keeps only the latest value, so bursts of updates may be coalesced.
//! That is fine for the guard: it only ever acts on the current state.

use marketplace_core::{AuthState, Navigator, SessionGuard, SessionView};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// [`Navigator`] that forwards replace commands over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    /// Create a navigator and the receiving end for its commands.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn replace(&mut self, target: &str) {
        tracing::debug!(target_path = target, "Session guard redirecting");
        if self.tx.send(target.to_owned()).is_err() {
            // Nobody is listening for navigation any more; the view is gone.
            tracing::debug!("Redirect dropped: navigation receiver closed");
        }
    }
}

/// Handle to a running guard.
#[derive(Debug)]
pub struct GuardHandle<U> {
    /// Latest session view, updated after every auth snapshot.
    pub view: watch::Receiver<SessionView<U>>,
    /// Redirect commands issued by the guard.
    pub redirects: mpsc::UnboundedReceiver<String>,
    task: JoinHandle<()>,
}

impl<U> GuardHandle<U> {
    /// Stop the guard.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the guard to stop (the auth source closed or every view
    /// receiver was dropped).
    ///
    /// # Errors
    ///
    /// Returns an error if the guard task panicked or was aborted.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.task.await
    }
}

/// Spawn a guard observing `auth` and redirecting to `redirect_target`.
///
/// The current snapshot is evaluated immediately, so a source that has already
/// resolved to "no user" redirects before the first change is published.
///
/// ```
/// use marketplace_core::{AuthState, DEFAULT_REDIRECT_TARGET};
/// use marketplace_web::services::spawn_session_guard;
/// use tokio::sync::watch;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (auth_tx, auth_rx) = watch::channel(AuthState::<u32>::loading());
/// let mut guard = spawn_session_guard(auth_rx, DEFAULT_REDIRECT_TARGET);
/// assert!(guard.view.borrow().loading);
///
/// // The provider finishes restoring the session and finds nobody.
/// auth_tx.send(AuthState::anonymous()).ok();
/// assert_eq!(guard.redirects.recv().await.as_deref(), Some(DEFAULT_REDIRECT_TARGET));
///
/// // A later sign-in is let through without another redirect.
/// auth_tx.send(AuthState::authenticated(42)).ok();
/// guard.view.wait_for(|view| view.is_authenticated).await.ok();
/// assert!(guard.redirects.try_recv().is_err());
/// # }
/// ```
#[must_use]
pub fn spawn_session_guard<U>(
    mut auth: watch::Receiver<AuthState<U>>,
    redirect_target: impl Into<String>,
) -> GuardHandle<U>
where
    U: Clone + Send + Sync + 'static,
{
    let (navigator, redirects) = ChannelNavigator::new();
    let mut guard = SessionGuard::new(navigator).with_redirect_target(redirect_target);

    let initial = auth.borrow_and_update().clone();
    let (view_tx, view) = watch::channel(guard.observe(&initial));

    let task = tokio::spawn(async move {
        while auth.changed().await.is_ok() {
            let snapshot = auth.borrow_and_update().clone();
            if view_tx.send(guard.observe(&snapshot)).is_err() {
                break;
            }
        }
        tracing::debug!("Session guard stopped");
    });

    GuardHandle {
        view,
        redirects,
        task,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use marketplace_core::DEFAULT_REDIRECT_TARGET;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::timeout;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_loading_source_never_redirects() {
        let (auth_tx, auth_rx) = watch::channel(AuthState::<u32>::loading());
        let mut handle = spawn_session_guard(auth_rx, DEFAULT_REDIRECT_TARGET);

        assert!(handle.view.borrow().loading);
        drop(auth_tx);
        timeout(WAIT, handle.view.changed()).await.unwrap().unwrap_err();
        let redirect = timeout(WAIT, handle.redirects.recv()).await.unwrap();
        assert_eq!(redirect, None);
    }

    #[tokio::test]
    async fn test_resolved_anonymous_redirects_once() {
        let (_auth_tx, auth_rx) = watch::channel(AuthState::<u32>::anonymous());
        let mut handle = spawn_session_guard(auth_rx, "/signin");

        assert_eq!(handle.redirects.recv().await.as_deref(), Some("/signin"));
        assert!(!handle.view.borrow().is_authenticated);
        assert_eq!(handle.redirects.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_loading_then_anonymous_redirects() {
        let (auth_tx, auth_rx) = watch::channel(AuthState::<u32>::loading());
        let mut handle = spawn_session_guard(auth_rx, DEFAULT_REDIRECT_TARGET);
        assert_eq!(handle.redirects.try_recv(), Err(TryRecvError::Empty));

        auth_tx.send(AuthState::anonymous()).unwrap();
        let target = timeout(WAIT, handle.redirects.recv()).await.unwrap();
        assert_eq!(target.as_deref(), Some(DEFAULT_REDIRECT_TARGET));
    }

    #[tokio::test]
    async fn test_resolving_to_user_after_redirect_does_not_redirect_again() {
        let (auth_tx, auth_rx) = watch::channel(AuthState::<u32>::anonymous());
        let mut handle = spawn_session_guard(auth_rx, DEFAULT_REDIRECT_TARGET);
        assert_eq!(
            handle.redirects.recv().await.as_deref(),
            Some(DEFAULT_REDIRECT_TARGET)
        );

        auth_tx.send(AuthState::loading()).unwrap();
        auth_tx.send(AuthState::authenticated(7)).unwrap();

        let view = timeout(WAIT, handle.view.wait_for(|v| v.is_authenticated))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(view.user, Some(7));
        assert_eq!(handle.redirects.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_guard_stops_when_source_closes() {
        let (auth_tx, auth_rx) = watch::channel(AuthState::authenticated(1_u32));
        let handle = spawn_session_guard(auth_rx, DEFAULT_REDIRECT_TARGET);

        drop(auth_tx);
        timeout(WAIT, handle.join()).await.unwrap().unwrap();
    }
}
