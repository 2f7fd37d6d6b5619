//! Core types for the marketplace.
//!
//! This module provides type-safe wrappers for the domain concepts the
//! commission engine and the session guard operate on.

pub mod id;
pub mod money;
pub mod plan;

pub use id::*;
pub use money::{Amount, AmountError};
pub use plan::{CommissionRate, PlanError, SubscriptionPlan};
