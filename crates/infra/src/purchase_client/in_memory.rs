use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use customercenter_core::{OfferIdentifier, ProductIdentifier};
use customercenter_offers::{
    CustomerInfoError, PurchaseClient, PurchaseError, SignedOfferData, SignedPromotionalOffer,
    SigningError,
};
use customercenter_store::{
    Discount, EntitlementInfo, EntitlementSnapshot, RefundRequestStatus, StoreProduct,
    TransactionRecord,
};

/// Store state a client can be seeded with (JSON fixture for the demo).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFixture {
    #[serde(default)]
    pub entitlements: EntitlementSnapshot,
    #[serde(default)]
    pub products: Vec<StoreProduct>,
}

#[derive(Debug)]
struct State {
    configured: bool,
    network_available: bool,
    entitlements: EntitlementSnapshot,
    /// Catalog order is insertion order.
    products: Vec<StoreProduct>,
    ineligible_offers: BTreeSet<OfferIdentifier>,
    next_purchase_error: Option<PurchaseError>,
    refund_status: RefundRequestStatus,
    transactions: Vec<TransactionRecord>,
    key_identifier: String,
}

impl Default for State {
    fn default() -> Self {
        Self {
            configured: true,
            network_available: true,
            entitlements: EntitlementSnapshot::new(),
            products: Vec::new(),
            ineligible_offers: BTreeSet::new(),
            next_purchase_error: None,
            refund_status: RefundRequestStatus::Success,
            transactions: Vec::new(),
            key_identifier: "in-memory-key".to_string(),
        }
    }
}

/// In-memory purchase client.
///
/// Intended for tests/dev. Signatures are random tokens, purchases always
/// succeed unless a failure was queued, and nothing leaves the process.
#[derive(Debug, Default)]
pub struct InMemoryPurchaseClient {
    state: RwLock<State>,
}

impl InMemoryPurchaseClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: StoreFixture) -> Self {
        let client = Self::new();
        if let Ok(mut state) = client.state.write() {
            state.entitlements = fixture.entitlements;
            state.products = fixture.products;
        }
        client
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        // A panic while holding the lock only happens in a failing test; the
        // state itself is still usable.
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_entitlement(self, info: EntitlementInfo) -> Self {
        self.write().entitlements.insert(info);
        self
    }

    /// Add a product, replacing any product with the same identifier.
    pub fn with_product(self, product: StoreProduct) -> Self {
        {
            let mut state = self.write();
            match state.products.iter_mut().find(|p| p.identifier == product.identifier) {
                Some(existing) => *existing = product,
                None => state.products.push(product),
            }
        }
        self
    }

    pub fn set_configured(&self, configured: bool) {
        self.write().configured = configured;
    }

    pub fn set_network_available(&self, available: bool) {
        self.write().network_available = available;
    }

    pub fn mark_ineligible(&self, offer_id: OfferIdentifier) {
        self.write().ineligible_offers.insert(offer_id);
    }

    /// Make the next purchase fail with `error`.
    pub fn fail_next_purchase(&self, error: PurchaseError) {
        self.write().next_purchase_error = Some(error);
    }

    pub fn set_refund_status(&self, status: RefundRequestStatus) {
        self.write().refund_status = status;
    }

    pub fn set_entitlements(&self, entitlements: EntitlementSnapshot) {
        self.write().entitlements = entitlements;
    }

    /// Completed transactions, oldest first.
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.read().transactions.clone()
    }

    fn customer_info(&self) -> Result<EntitlementSnapshot, CustomerInfoError> {
        let state = self.read();
        if !state.configured {
            return Err(CustomerInfoError::ClientUnconfigured);
        }
        if !state.network_available {
            return Err(CustomerInfoError::Network("network unreachable".to_string()));
        }
        Ok(state.entitlements.clone())
    }
}

#[async_trait]
impl PurchaseClient for InMemoryPurchaseClient {
    async fn fetch_entitlements(&self) -> Result<EntitlementSnapshot, CustomerInfoError> {
        self.customer_info()
    }

    async fn fetch_products(&self, ids: &BTreeSet<ProductIdentifier>) -> Vec<StoreProduct> {
        let state = self.read();
        if !state.configured || !state.network_available {
            return Vec::new();
        }
        state
            .products
            .iter()
            .filter(|p| ids.contains(&p.identifier))
            .cloned()
            .collect()
    }

    async fn sign_promotional_offer(
        &self,
        discount: &Discount,
        product: &StoreProduct,
    ) -> Result<SignedPromotionalOffer, SigningError> {
        let state = self.read();
        if !state.configured {
            return Err(SigningError::ClientUnconfigured);
        }
        let offer_id = discount
            .offer_identifier
            .as_ref()
            .ok_or(SigningError::MissingOfferIdentifier)?;
        if state.ineligible_offers.contains(offer_id) {
            return Err(SigningError::Ineligible(offer_id.clone()));
        }
        if !product.discounts.contains(discount) {
            return Err(SigningError::Store(format!(
                "{offer_id} is not offered for {}",
                product.identifier
            )));
        }

        let nonce = Uuid::now_v7();
        tracing::debug!(
            %offer_id,
            product_id = %product.identifier,
            %nonce,
            "signing promotional offer"
        );
        Ok(SignedPromotionalOffer::new(
            discount.clone(),
            product.identifier.clone(),
            SignedOfferData {
                key_identifier: state.key_identifier.clone(),
                nonce,
                signature: format!("{}.{}.{}", state.key_identifier, offer_id, nonce.simple()),
                timestamp: Utc::now(),
            },
        ))
    }

    async fn purchase(
        &self,
        product: &StoreProduct,
        offer: &SignedPromotionalOffer,
    ) -> Result<TransactionRecord, PurchaseError> {
        let mut state = self.write();
        if !state.configured {
            return Err(PurchaseError::ClientUnconfigured);
        }
        if let Some(error) = state.next_purchase_error.take() {
            return Err(error);
        }

        let now = Utc::now();
        let record = TransactionRecord {
            transaction_identifier: format!("txn_{}", Uuid::now_v7().simple()),
            product_identifier: product.identifier.clone(),
            offer_identifier: offer.offer_identifier().cloned(),
            purchase_date: now,
        };

        // Redeeming an offer re-enables renewal on the matching entitlements.
        let renewed: Vec<EntitlementInfo> = state
            .entitlements
            .iter()
            .filter(|e| e.product_identifier == product.identifier)
            .cloned()
            .map(|mut e| {
                e.is_active = true;
                e.will_renew = true;
                e.latest_purchase_date = Some(now);
                e
            })
            .collect();
        for info in renewed {
            state.entitlements.insert(info);
        }

        state.transactions.push(record.clone());
        Ok(record)
    }

    async fn restore_purchases(&self) -> Result<EntitlementSnapshot, CustomerInfoError> {
        self.customer_info()
    }

    async fn begin_refund_request(&self, product_id: &ProductIdentifier) -> RefundRequestStatus {
        let state = self.read();
        let owns_product = state.entitlements.active().any(|e| &e.product_identifier == product_id);
        if !state.configured || !owns_product {
            return RefundRequestStatus::Error;
        }
        state.refund_status
    }
}
