use serde::{Deserialize, Serialize};

use customercenter_core::{OfferIdentifier, ProductIdentifier};

use crate::period::{SubscriptionPeriod, pluralize};

/// How the customer pays during a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Nothing is charged for the discounted periods.
    FreeTrial,
    /// The discounted price is charged every period.
    PayAsYouGo,
    /// The discounted price is charged once for all periods.
    PayUpFront,
}

/// A priced variant of a subscription product (intro, promotional, win-back).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    /// Absent for legacy store-layer offers; those can never be matched by id.
    pub offer_identifier: Option<OfferIdentifier>,
    pub payment_mode: PaymentMode,
    pub number_of_periods: u32,
    pub subscription_period: SubscriptionPeriod,
    pub localized_price_string: String,
}

impl Discount {
    pub fn new(
        offer_identifier: Option<OfferIdentifier>,
        payment_mode: PaymentMode,
        number_of_periods: u32,
        subscription_period: SubscriptionPeriod,
        localized_price_string: impl Into<String>,
    ) -> Self {
        Self {
            offer_identifier,
            payment_mode,
            number_of_periods,
            subscription_period,
            localized_price_string: localized_price_string.into(),
        }
    }

    pub fn matches(&self, offer_id: &OfferIdentifier) -> bool {
        self.offer_identifier.as_ref() == Some(offer_id)
    }

    /// "$0.99/mo".
    pub fn localized_price_per_period(&self) -> String {
        format!(
            "{}/{}",
            self.localized_price_string,
            self.subscription_period.abbreviated_unit()
        )
    }

    /// "3 months": total discounted duration.
    pub fn localized_number_of_periods(&self) -> String {
        pluralize(self.number_of_periods, self.subscription_period.unit)
    }

    /// Headline describing the discount according to its payment mode.
    ///
    /// - free trial: "1 week for free"
    /// - pay as you go: "$0.99/mo for 3 months"
    /// - pay up front: "3 months for $0.99"
    pub fn localized_price_per_period_by_payment_mode(&self) -> String {
        let period = self.subscription_period.period_title();
        match self.payment_mode {
            PaymentMode::FreeTrial => format!("{period} for free"),
            PaymentMode::PayAsYouGo => format!(
                "{} for {}",
                self.localized_price_per_period(),
                self.localized_number_of_periods()
            ),
            PaymentMode::PayUpFront => format!("{period} for {}", self.localized_price_string),
        }
    }
}

/// Catalog entry for a store product, as returned by the purchase SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProduct {
    pub identifier: ProductIdentifier,
    pub localized_title: String,
    pub localized_price_string: String,
    /// `None` for non-subscription products.
    pub subscription_period: Option<SubscriptionPeriod>,
    /// Native store order.
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

impl StoreProduct {
    pub fn new(
        identifier: ProductIdentifier,
        localized_title: impl Into<String>,
        localized_price_string: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            localized_title: localized_title.into(),
            localized_price_string: localized_price_string.into(),
            subscription_period: None,
            discounts: Vec::new(),
        }
    }

    pub fn with_period(mut self, period: SubscriptionPeriod) -> Self {
        self.subscription_period = Some(period);
        self
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discounts.push(discount);
        self
    }

    /// First discount carrying `offer_id`, in native order.
    ///
    /// Duplicate offer ids within one product are not expected from the store;
    /// if they happen, the earliest one wins.
    pub fn discount_for(&self, offer_id: &OfferIdentifier) -> Option<&Discount> {
        self.discounts.iter().find(|d| d.matches(offer_id))
    }

    pub fn has_discount(&self, offer_id: &OfferIdentifier) -> bool {
        self.discount_for(offer_id).is_some()
    }

    /// "$9.99/mo", or the bare price for products without a period.
    pub fn localized_price_per_period(&self) -> String {
        match &self.subscription_period {
            Some(period) => {
                format!("{}/{}", self.localized_price_string, period.abbreviated_unit())
            }
            None => self.localized_price_string.clone(),
        }
    }
}
