//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Session layer (tower-sessions, bounded in-memory store)
//! 4. Request ID (add unique ID to each request)
//!
//! The session guard itself runs as an extractor ([`RequireSession`]) on the
//! routes it protects.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    AuthRejection, RequireSession, SessionContext, VerifiedProvider, clear_current_user,
    load_auth_state, set_current_user,
};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{BoundedMemoryStore, create_session_layer};
