//! Contract of the purchase SDK this crate sits on.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use customercenter_core::{OfferIdentifier, ProductIdentifier};
use customercenter_store::{
    Discount, EntitlementSnapshot, RefundRequestStatus, StoreProduct, TransactionRecord,
};

/// Customer info (entitlements) could not be fetched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustomerInfoError {
    #[error("purchase client is not configured")]
    ClientUnconfigured,

    #[error("network error: {0}")]
    Network(String),
}

/// The SDK refused or failed to sign a promotional offer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("purchase client is not configured")]
    ClientUnconfigured,

    /// Legacy store-layer discounts carry no offer identifier and cannot be signed.
    #[error("discount has no offer identifier")]
    MissingOfferIdentifier,

    #[error("customer is not eligible for offer {0}")]
    Ineligible(OfferIdentifier),

    #[error("store error: {0}")]
    Store(String),
}

/// A purchase did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("purchase client is not configured")]
    ClientUnconfigured,

    #[error("purchase cancelled by user")]
    UserCancelled,

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    /// The signed offer belongs to a different product than the one purchased.
    #[error("signed offer for {offer_product} cannot be used to purchase {product}")]
    OfferMismatch {
        product: ProductIdentifier,
        offer_product: ProductIdentifier,
    },

    #[error("store error: {0}")]
    Store(String),
}

impl PurchaseError {
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, PurchaseError::UserCancelled)
    }
}

/// Signature material returned by the offer-signing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOfferData {
    pub key_identifier: String,
    pub nonce: Uuid,
    pub signature: String,
    pub timestamp: DateTime<Utc>,
}

/// A promotional offer signed for one specific (product, discount) pair.
///
/// Opaque to this crate beyond the pairing: it is produced by
/// [`PurchaseClient::sign_promotional_offer`] and consumed by
/// [`PurchaseClient::purchase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPromotionalOffer {
    discount: Discount,
    product_identifier: ProductIdentifier,
    signed_data: SignedOfferData,
}

impl SignedPromotionalOffer {
    pub fn new(
        discount: Discount,
        product_identifier: ProductIdentifier,
        signed_data: SignedOfferData,
    ) -> Self {
        Self {
            discount,
            product_identifier,
            signed_data,
        }
    }

    pub fn discount(&self) -> &Discount {
        &self.discount
    }

    pub fn product_identifier(&self) -> &ProductIdentifier {
        &self.product_identifier
    }

    pub fn offer_identifier(&self) -> Option<&OfferIdentifier> {
        self.discount.offer_identifier.as_ref()
    }

    pub fn signed_data(&self) -> &SignedOfferData {
        &self.signed_data
    }

    /// Whether this offer was signed for `product`.
    pub fn belongs_to(&self, product: &StoreProduct) -> bool {
        self.product_identifier == product.identifier
    }
}

/// Purchase SDK seen from the Customer Center.
///
/// Implementations own networking, retries, timeouts and cancellation. Every
/// method is a single suspension point for callers.
#[async_trait]
pub trait PurchaseClient: Send + Sync {
    /// Current entitlement state of the signed-in customer.
    async fn fetch_entitlements(&self) -> Result<EntitlementSnapshot, CustomerInfoError>;

    /// Catalog entries for `ids`. Unknown ids are skipped; a total miss is an
    /// empty vector, never an error.
    async fn fetch_products(&self, ids: &BTreeSet<ProductIdentifier>) -> Vec<StoreProduct>;

    async fn sign_promotional_offer(
        &self,
        discount: &Discount,
        product: &StoreProduct,
    ) -> Result<SignedPromotionalOffer, SigningError>;

    /// Execute a purchase. Moves money; owned entirely by the SDK.
    async fn purchase(
        &self,
        product: &StoreProduct,
        offer: &SignedPromotionalOffer,
    ) -> Result<TransactionRecord, PurchaseError>;

    /// Re-sync purchases with the store and return the refreshed entitlements.
    async fn restore_purchases(&self) -> Result<EntitlementSnapshot, CustomerInfoError>;

    /// Present the store's refund request sheet for `product_id`.
    async fn begin_refund_request(&self, product_id: &ProductIdentifier) -> RefundRequestStatus;
}
