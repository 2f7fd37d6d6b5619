//! `mp-cli split` - commission and payout for one amount.

use marketplace_core::{Amount, CommissionError, CommissionSplit, SubscriptionPlan};

use super::CliError;

/// Split `amount` under `plan` and render the result.
///
/// # Errors
///
/// Returns an error if the plan is unknown or the amount is not a valid
/// non-negative cent value.
pub fn render(amount: &str, plan: &str, json: bool) -> Result<String, CliError> {
    let plan: SubscriptionPlan = plan.parse().map_err(CommissionError::from)?;
    let amount: Amount = amount.parse().map_err(CommissionError::from)?;
    let split = CommissionSplit::compute(amount, plan);

    if json {
        return Ok(serde_json::to_string_pretty(&split)?);
    }

    Ok(format!(
        "amount:     {}\nplan:       {} ({})\ncommission: {}\npayout:     {}",
        split.amount, split.plan, split.rate, split.commission, split.payout
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketplace_core::{AmountError, PlanError};

    use super::*;

    #[test]
    fn test_text_output() {
        let output = render("100", "free", false).unwrap();
        assert_eq!(
            output,
            "amount:     100.00\nplan:       free (15%)\ncommission: 15.00\npayout:     85.00"
        );
    }

    #[test]
    fn test_json_output() {
        let output = render("100.00", "pro", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["commission"], "3.00");
        assert_eq!(value["payout"], "97.00");
    }

    #[test]
    fn test_unknown_plan() {
        let err = render("100", "enterprise", false).unwrap_err();
        assert!(matches!(
            err,
            CliError::Commission(CommissionError::InvalidPlan(PlanError::Unknown(_)))
        ));
    }

    #[test]
    fn test_bad_amounts() {
        for amount in ["-1", "abc", "1.005"] {
            let err = render(amount, "free", false).unwrap_err();
            assert!(
                matches!(err, CliError::Commission(CommissionError::InvalidAmount(_))),
                "{amount}"
            );
        }
        assert!(matches!(
            render("-1", "pro", false),
            Err(CliError::Commission(CommissionError::InvalidAmount(
                AmountError::Negative(_)
            )))
        ));
    }
}
