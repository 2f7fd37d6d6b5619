//! Checkout settlement.
//!
//! Called once the payment processor has confirmed a charge. The charge is
//! split between the platform and the signed-in merchant according to the plan
//! stored with the merchant's session; the response is what downstream
//! settlement consumes.

use axum::Json;
use marketplace_core::{Amount, CommissionError, CommissionSplit, MerchantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::RequireSession;

/// Longest processor reference we pass through.
const MAX_REFERENCE_LEN: usize = 255;

/// Completed checkout as reported by the payment processor.
///
/// Carries no plan: the rate always comes from the session. Unknown fields
/// (such as a `plan`) are rejected rather than ignored.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    pub amount: Decimal,
    /// Processor charge/payment ID, echoed back for reconciliation.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Settlement instruction for a completed checkout.
#[derive(Debug, Serialize)]
pub struct Settlement {
    pub merchant_id: MerchantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub split: CommissionSplit,
}

/// Split a completed checkout between the platform and the merchant.
pub async fn complete(
    RequireSession(user): RequireSession,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Settlement>> {
    if request
        .reference
        .as_ref()
        .is_some_and(|r| r.len() > MAX_REFERENCE_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "reference must be at most {MAX_REFERENCE_LEN} characters"
        )));
    }

    let amount = Amount::new(request.amount).map_err(CommissionError::from)?;
    let split = CommissionSplit::compute(amount, user.plan);
    let merchant_id = MerchantId::from(user.id);

    tracing::info!(
        %merchant_id,
        plan = %split.plan,
        amount = %split.amount,
        commission = %split.commission,
        payout = %split.payout,
        "Checkout settled"
    );

    Ok(Json(Settlement {
        merchant_id,
        reference: request.reference,
        split,
    }))
}
