//! Marketplace Core - commission engine and session guard.
//!
//! This crate holds the only business rules of the marketplace:
//! - `commission` - platform commission and merchant payout per plan tier
//! - `session` - the guard that keeps protected views behind a signed-in user
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no I/O, no
//! HTTP, no async runtime. The identity provider and the navigation layer are
//! reached through the [`session::Navigator`] trait and the [`session::AuthState`]
//! snapshot, so the web crate (or any other host) supplies them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, amounts and plan tiers
//! - [`commission`] - Commission/payout calculation
//! - [`session`] - Auth state, session view and the redirecting guard

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commission;
pub mod session;
pub mod types;

pub use commission::{CommissionError, CommissionSplit, calculate_commission, calculate_payout};
pub use session::{
    AuthState, DEFAULT_REDIRECT_TARGET, GuardDecision, GuardState, Navigator, SessionGuard,
    SessionView, UserIdentity,
};
pub use types::*;
