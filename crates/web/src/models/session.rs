//! Session-related types.
//!
//! Types stored in the session for authentication state.

/// Session-stored user identity.
///
/// Exactly what the identity provider reported; the session guard only checks
/// whether one is present.
pub type CurrentUser = marketplace_core::UserIdentity;

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
