//! Subscription plan tiers and their commission rates.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a plan name is not one of the known tiers.
///
/// An unknown plan is never mapped onto a default tier: charging the wrong
/// rate silently is worse than refusing the payment.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The name does not match any plan.
    #[error("unknown subscription plan: {0:?} (expected one of: free, pro)")]
    Unknown(String),
}

/// Merchant subscription tier.
///
/// Set by upstream billing state and immutable for the duration of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// No subscription; the platform keeps 15%.
    Free,
    /// Paid subscription; the platform keeps 3%.
    Pro,
}

impl SubscriptionPlan {
    /// Every plan, in ascending price order.
    pub const ALL: [Self; 2] = [Self::Free, Self::Pro];

    /// The platform's commission rate for this plan.
    #[must_use]
    pub const fn commission_rate(self) -> CommissionRate {
        match self {
            Self::Free => CommissionRate::from_percent(15),
            Self::Pro => CommissionRate::from_percent(3),
        }
    }

    /// The wire name of the plan (`"free"` or `"pro"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            _ => Err(PlanError::Unknown(s.to_owned())),
        }
    }
}

/// A commission rate as a fraction of the transaction amount (`0.15` = 15%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    /// Build a rate from a whole percentage.
    #[must_use]
    pub const fn from_percent(percent: u32) -> Self {
        Self(Decimal::from_parts(percent, 0, 0, false, 2))
    }

    /// The rate as a fraction.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table() {
        assert_eq!(
            SubscriptionPlan::Free.commission_rate().as_decimal(),
            Decimal::new(15, 2)
        );
        assert_eq!(
            SubscriptionPlan::Pro.commission_rate().as_decimal(),
            Decimal::new(3, 2)
        );
    }

    #[test]
    fn test_rates_are_fractions() {
        for plan in SubscriptionPlan::ALL {
            let rate = plan.commission_rate().as_decimal();
            assert!(rate >= Decimal::ZERO && rate <= Decimal::ONE, "{plan}: {rate}");
        }
    }

    #[test]
    fn test_parse_known_plans() {
        assert_eq!("free".parse::<SubscriptionPlan>().unwrap(), SubscriptionPlan::Free);
        assert_eq!("pro".parse::<SubscriptionPlan>().unwrap(), SubscriptionPlan::Pro);
    }

    #[test]
    fn test_parse_unknown_plan_fails() {
        assert_eq!(
            "enterprise".parse::<SubscriptionPlan>(),
            Err(PlanError::Unknown("enterprise".to_string()))
        );
        assert!("".parse::<SubscriptionPlan>().is_err());
        assert!("Pro".parse::<SubscriptionPlan>().is_err());
    }

    #[test]
    fn test_display_matches_wire_name() {
        for plan in SubscriptionPlan::ALL {
            let json = serde_json::to_string(&plan).unwrap();
            assert_eq!(json, format!("\"{plan}\""));
        }
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(SubscriptionPlan::Free.commission_rate().to_string(), "15%");
        assert_eq!(SubscriptionPlan::Pro.commission_rate().to_string(), "3%");
    }
}
