//! Text of the promotional offer sheet.

use serde::Serialize;

use customercenter_store::{Discount, StoreProduct};

pub const HEADLINE: &str = "Wait!";
pub const SUBTITLE: &str = "Before you go, here's a one-time offer to continue at a discount.";
pub const DECLINE_LABEL: &str = "No thanks";

/// Everything the offer sheet renders, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPresentation {
    pub headline: String,
    pub subtitle: String,
    /// Discount terms, e.g. "$0.99/mo for 3 months".
    pub offer_title: String,
    /// Regular price after the discount, e.g. "then $9.99/mo".
    pub then_title: String,
    pub decline_label: String,
}

impl OfferPresentation {
    pub fn new(product: &StoreProduct, discount: &Discount) -> Self {
        Self {
            headline: HEADLINE.to_string(),
            subtitle: SUBTITLE.to_string(),
            offer_title: discount.localized_price_per_period_by_payment_mode(),
            then_title: format!("then {}", product.localized_price_per_period()),
            decline_label: DECLINE_LABEL.to_string(),
        }
    }
}
