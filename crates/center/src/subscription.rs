//! Summary of the customer's current subscription.

use serde::Serialize;

use customercenter_core::{ProductIdentifier, Store};
use customercenter_store::{EntitlementInfo, StoreProduct};

/// What the details block of the management screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInformation {
    pub title: String,
    pub duration_title: String,
    pub price: String,
    /// "Renews" or "Expires".
    pub renewal_string: String,
    pub next_renewal_string: Option<String>,
    pub will_renew: bool,
    pub active: bool,
    pub product_identifier: ProductIdentifier,
    pub store: Store,
}

impl SubscriptionInformation {
    /// Build from an entitlement and, when the store knows it, its product.
    pub fn new(entitlement: &EntitlementInfo, product: Option<&StoreProduct>) -> Self {
        let (title, duration_title, price) = match product {
            Some(product) => (
                product.localized_title.clone(),
                product
                    .subscription_period
                    .map(|p| p.period_title())
                    .unwrap_or_else(|| "Lifetime".to_string()),
                product.localized_price_per_period(),
            ),
            None => (
                entitlement.product_identifier.to_string(),
                String::new(),
                String::new(),
            ),
        };

        let renewal_string = if entitlement.will_renew { "Renews" } else { "Expires" };

        Self {
            title,
            duration_title,
            price,
            renewal_string: renewal_string.to_string(),
            next_renewal_string: entitlement
                .expiration_date
                .map(|date| date.format("%B %-d, %Y").to_string()),
            will_renew: entitlement.will_renew,
            active: entitlement.is_active,
            product_identifier: entitlement.product_identifier.clone(),
            store: entitlement.store,
        }
    }

    /// "Pro - 1 month".
    pub fn heading(&self) -> String {
        if self.duration_title.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.duration_title)
        }
    }

    /// "Renews: March 5, 2025".
    pub fn renewal_line(&self) -> Option<String> {
        self.next_renewal_string
            .as_ref()
            .map(|date| format!("{}: {date}", self.renewal_string))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use customercenter_core::EntitlementKey;
    use customercenter_store::SubscriptionPeriod;

    use super::*;

    fn pro_entitlement() -> EntitlementInfo {
        EntitlementInfo::active(
            EntitlementKey::new("pro").unwrap(),
            Store::AppStore,
            ProductIdentifier::new("com.app.pro").unwrap(),
        )
        .with_expiration(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap())
    }

    #[test]
    fn renewing_monthly_subscription() {
        let pro = ProductIdentifier::new("com.app.pro").unwrap();
        let product = StoreProduct::new(pro, "Pro", "$9.99")
            .with_period(SubscriptionPeriod::monthly());

        let info = SubscriptionInformation::new(&pro_entitlement(), Some(&product));
        assert_eq!(info.heading(), "Pro - 1 month");
        assert_eq!(info.price, "$9.99/mo");
        assert_eq!(info.renewal_line().as_deref(), Some("Renews: March 5, 2025"));
        assert!(info.active);
    }

    #[test]
    fn expiring_subscription_without_catalog_entry() {
        let entitlement = pro_entitlement().with_will_renew(false);

        let info = SubscriptionInformation::new(&entitlement, None);
        assert_eq!(info.heading(), "com.app.pro");
        assert_eq!(info.renewal_line().as_deref(), Some("Expires: March 5, 2025"));
    }
}
