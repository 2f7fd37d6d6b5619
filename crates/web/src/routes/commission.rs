//! Commission quotes.

use axum::Json;
use marketplace_core::{CommissionRate, CommissionSplit, SubscriptionPlan};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Quote request: the plan arrives as a raw string so unknown tiers surface
/// as a commission error instead of a generic body rejection.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub amount: Decimal,
    pub plan: String,
}

/// One row of the rate table.
#[derive(Debug, Serialize)]
pub struct RateView {
    pub plan: SubscriptionPlan,
    pub rate: CommissionRate,
}

/// List the commission rate of every plan.
pub async fn rates() -> Json<Vec<RateView>> {
    Json(
        SubscriptionPlan::ALL
            .into_iter()
            .map(|plan| RateView {
                plan,
                rate: plan.commission_rate(),
            })
            .collect(),
    )
}

/// Quote commission and payout for an amount.
pub async fn quote(Json(request): Json<QuoteRequest>) -> Result<Json<CommissionSplit>> {
    let split = CommissionSplit::from_raw(request.amount, &request.plan)?;
    Ok(Json(split))
}
