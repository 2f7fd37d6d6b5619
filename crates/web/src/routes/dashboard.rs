//! Session-aware views.

use axum::Json;
use marketplace_core::{AuthState, SessionView};

use crate::middleware::{RequireSession, SessionContext};
use crate::models::CurrentUser;

/// Protected dashboard: only reachable with a signed-in user.
pub async fn show(RequireSession(user): RequireSession) -> Json<SessionView<CurrentUser>> {
    Json(SessionView::from(AuthState::authenticated(user)))
}

/// Current session view for client-side rendering; never rejects.
pub async fn session(SessionContext(view): SessionContext) -> Json<SessionView<CurrentUser>> {
    Json(view)
}
