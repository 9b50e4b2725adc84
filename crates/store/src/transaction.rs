use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use customercenter_core::{OfferIdentifier, ProductIdentifier};

/// Store transaction produced by a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_identifier: String,
    pub product_identifier: ProductIdentifier,
    /// Set when the purchase redeemed a promotional offer.
    pub offer_identifier: Option<OfferIdentifier>,
    pub purchase_date: DateTime<Utc>,
}

/// Outcome of a refund request sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundRequestStatus {
    Success,
    UserCancelled,
    Error,
}

impl RefundRequestStatus {
    /// Short status line shown under the subscription details.
    pub fn message(&self) -> &'static str {
        match self {
            RefundRequestStatus::Success => "Success",
            RefundRequestStatus::UserCancelled => "Cancelled",
            RefundRequestStatus::Error => "Error",
        }
    }
}
