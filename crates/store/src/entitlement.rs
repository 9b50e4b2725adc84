//! Entitlement snapshot as reported by the purchase SDK.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use customercenter_core::{EntitlementKey, ProductIdentifier, Store};

/// One entitlement grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementInfo {
    pub identifier: EntitlementKey,
    pub store: Store,
    pub product_identifier: ProductIdentifier,
    pub is_active: bool,
    pub will_renew: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    pub latest_purchase_date: Option<DateTime<Utc>>,
}

impl EntitlementInfo {
    /// An active, auto-renewing entitlement with no dates attached.
    pub fn active(
        identifier: EntitlementKey,
        store: Store,
        product_identifier: ProductIdentifier,
    ) -> Self {
        Self {
            identifier,
            store,
            product_identifier,
            is_active: true,
            will_renew: true,
            expiration_date: None,
            latest_purchase_date: None,
        }
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration);
        self
    }

    pub fn with_will_renew(mut self, will_renew: bool) -> Self {
        self.will_renew = will_renew;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Entitlements keyed by identifier, in the order the SDK reported them.
///
/// Order matters: "the first App Store entitlement" is defined by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitlementSnapshot {
    entries: Vec<EntitlementInfo>,
}

impl EntitlementSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entitlement. A replaced entry keeps its position.
    pub fn insert(&mut self, info: EntitlementInfo) {
        match self.entries.iter_mut().find(|e| e.identifier == info.identifier) {
            Some(existing) => *existing = info,
            None => self.entries.push(info),
        }
    }

    pub fn with(mut self, info: EntitlementInfo) -> Self {
        self.insert(info);
        self
    }

    pub fn get(&self, key: &EntitlementKey) -> Option<&EntitlementInfo> {
        self.entries.iter().find(|e| &e.identifier == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitlementInfo> {
        self.entries.iter()
    }

    /// Active entitlements in native order.
    pub fn active(&self) -> impl Iterator<Item = &EntitlementInfo> {
        self.entries.iter().filter(|e| e.is_active)
    }

    /// First active entitlement granted by `store`.
    pub fn first_active_from(&self, store: Store) -> Option<&EntitlementInfo> {
        self.active().find(|e| e.store == store)
    }

    /// First active entitlement from a store that can sign promotional offers.
    pub fn first_offer_eligible(&self) -> Option<&EntitlementInfo> {
        self.active().find(|e| e.store.supports_promotional_offers())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<EntitlementInfo> for EntitlementSnapshot {
    fn from_iter<I: IntoIterator<Item = EntitlementInfo>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for info in iter {
            snapshot.insert(info);
        }
        snapshot
    }
}
