//! Long-running services hosted by the web process.

pub mod guard;

pub use guard::{ChannelNavigator, GuardHandle, spawn_session_guard};
