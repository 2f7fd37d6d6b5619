//! Platform commission and merchant payout.
//!
//! The platform keeps a plan-dependent share of every settled amount; the
//! merchant receives the rest. Commission is rounded to cents half away from
//! zero and the payout is derived by subtraction, so for every input
//!
//! ```text
//! commission + payout == amount
//! ```
//!
//! holds exactly: no cent is ever lost or counted twice.
//!
//! All functions here are pure. They may be called concurrently from any
//! number of request handlers without coordination.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Amount, AmountError, CommissionRate, PlanError, SubscriptionPlan};

/// Errors raised when turning raw billing input into a commission split.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommissionError {
    /// The plan is not one of the known tiers.
    #[error("invalid plan: {0}")]
    InvalidPlan(#[from] PlanError),

    /// The amount is negative, non-finite or finer than a cent.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

/// Commission owed to the platform for `amount` under `plan`.
///
/// The result is never negative and never exceeds `amount`.
///
/// # Examples
///
/// ```
/// use marketplace_core::{Amount, SubscriptionPlan, calculate_commission};
///
/// let amount = Amount::from_cents(10_000);
/// assert_eq!(calculate_commission(amount, SubscriptionPlan::Free).to_string(), "15.00");
/// assert_eq!(calculate_commission(amount, SubscriptionPlan::Pro).to_string(), "3.00");
/// ```
#[must_use]
pub fn calculate_commission(amount: Amount, plan: SubscriptionPlan) -> Amount {
    let raw = amount.as_decimal() * plan.commission_rate().as_decimal();
    Amount::round_from(raw)
}

/// Amount due to the merchant after commission.
///
/// # Examples
///
/// ```
/// use marketplace_core::{Amount, SubscriptionPlan, calculate_payout};
///
/// let amount = Amount::from_cents(10_000);
/// assert_eq!(calculate_payout(amount, SubscriptionPlan::Free).to_string(), "85.00");
/// assert_eq!(calculate_payout(amount, SubscriptionPlan::Pro).to_string(), "97.00");
/// ```
#[must_use]
pub fn calculate_payout(amount: Amount, plan: SubscriptionPlan) -> Amount {
    amount.saturating_sub(calculate_commission(amount, plan))
}

/// A settled amount split between the platform and the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommissionSplit {
    /// The gross amount being settled.
    pub amount: Amount,
    /// The merchant's plan at settlement time.
    pub plan: SubscriptionPlan,
    /// Rate applied for `plan`.
    pub rate: CommissionRate,
    /// Platform share.
    pub commission: Amount,
    /// Merchant share.
    pub payout: Amount,
}

impl CommissionSplit {
    /// Split a validated amount.
    #[must_use]
    pub fn compute(amount: Amount, plan: SubscriptionPlan) -> Self {
        let commission = calculate_commission(amount, plan);
        Self {
            amount,
            plan,
            rate: plan.commission_rate(),
            commission,
            payout: amount.saturating_sub(commission),
        }
    }

    /// Validate raw billing input and split it.
    ///
    /// # Errors
    ///
    /// Returns [`CommissionError::InvalidPlan`] for an unknown plan name and
    /// [`CommissionError::InvalidAmount`] for a negative or sub-cent amount.
    pub fn from_raw(amount: Decimal, plan: &str) -> Result<Self, CommissionError> {
        let plan: SubscriptionPlan = plan.parse()?;
        let amount = Amount::new(amount)?;
        Ok(Self::compute(amount, plan))
    }
}
