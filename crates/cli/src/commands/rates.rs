//! `mp-cli rates` - the commission rate table.

use marketplace_core::SubscriptionPlan;
use rust_decimal::Decimal;

use super::CliError;

/// Render the rate of every plan.
///
/// # Errors
///
/// Returns an error if JSON rendering fails.
pub fn render(json: bool) -> Result<String, CliError> {
    if json {
        let table: serde_json::Map<String, serde_json::Value> = SubscriptionPlan::ALL
            .into_iter()
            .map(|plan| {
                let rate: Decimal = plan.commission_rate().as_decimal();
                (plan.to_string(), serde_json::Value::String(rate.to_string()))
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&table)?);
    }

    Ok(SubscriptionPlan::ALL
        .into_iter()
        .map(|plan| format!("{plan:<6} {}", plan.commission_rate()))
        .collect::<Vec<_>>()
        .join("\n"))
}
