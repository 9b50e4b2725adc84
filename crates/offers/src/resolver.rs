//! Matching a promotional offer identifier to the customer's subscription.

use std::collections::BTreeSet;
use std::sync::Arc;

use customercenter_core::{DomainError, DomainResult, OfferIdentifier};
use customercenter_store::{StoreProduct, TransactionRecord};

use crate::client::{
    CustomerInfoError, PurchaseClient, PurchaseError, SignedPromotionalOffer, SigningError,
};

/// Result of [`PurchaseClient::purchase`], passed through unchanged.
pub type PurchaseOutcome = Result<TransactionRecord, PurchaseError>;

/// A product together with the offer signed for it.
///
/// Fields are private so the pairing cannot be broken after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOffer {
    product: StoreProduct,
    signed_offer: SignedPromotionalOffer,
}

impl ResolvedOffer {
    /// Pair a product with an offer obtained elsewhere (e.g. handed over by a
    /// previous screen). Fails if the offer was signed for another product.
    pub fn pair(product: StoreProduct, signed_offer: SignedPromotionalOffer) -> DomainResult<Self> {
        if !signed_offer.belongs_to(&product) {
            return Err(DomainError::validation(format!(
                "offer signed for {} paired with product {}",
                signed_offer.product_identifier(),
                product.identifier
            )));
        }
        Ok(Self {
            product,
            signed_offer,
        })
    }

    pub fn product(&self) -> &StoreProduct {
        &self.product
    }

    pub fn signed_offer(&self) -> &SignedPromotionalOffer {
        &self.signed_offer
    }

    pub fn into_parts(self) -> (StoreProduct, SignedPromotionalOffer) {
        (self.product, self.signed_offer)
    }
}

/// What [`PromotionalOfferResolver::resolve`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved(ResolvedOffer),
    /// No active entitlement was purchased through the App Store.
    NoActiveAppStoreSubscription,
    /// The entitlement's product does not carry the requested offer.
    NoMatchingProduct,
    /// A product matched but the discount could not be selected.
    NoMatchingDiscount,
    OfferSigningFailed(SigningError),
}

impl ResolutionResult {
    /// Stable name of the variant, for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionResult::Resolved(_) => "resolved",
            ResolutionResult::NoActiveAppStoreSubscription => "no_active_app_store_subscription",
            ResolutionResult::NoMatchingProduct => "no_matching_product",
            ResolutionResult::NoMatchingDiscount => "no_matching_discount",
            ResolutionResult::OfferSigningFailed(_) => "offer_signing_failed",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }

    pub fn into_resolved(self) -> Option<ResolvedOffer> {
        match self {
            ResolutionResult::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }
}

/// Resolves promotional offers against fresh SDK state.
///
/// Stateless between calls: nothing fetched by one `resolve` is reused by the
/// next, so concurrent calls are independent.
#[derive(Clone)]
pub struct PromotionalOfferResolver {
    client: Arc<dyn PurchaseClient>,
}

impl core::fmt::Debug for PromotionalOfferResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PromotionalOfferResolver").finish_non_exhaustive()
    }
}

impl PromotionalOfferResolver {
    pub fn new(client: Arc<dyn PurchaseClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn PurchaseClient> {
        &self.client
    }

    /// Find the customer's App Store product carrying `offer_id` and sign the
    /// offer for it.
    ///
    /// Only a failure to fetch customer info is an `Err`; every other way of
    /// not finding an offer is a [`ResolutionResult`] variant.
    #[tracing::instrument(skip_all, fields(offer_id = %offer_id))]
    pub async fn resolve(
        &self,
        offer_id: &OfferIdentifier,
    ) -> Result<ResolutionResult, CustomerInfoError> {
        let entitlements = self
            .client
            .fetch_entitlements()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch customer info"))?;

        let Some(entitlement) = entitlements.first_offer_eligible() else {
            tracing::info!("no active App Store subscription");
            return Ok(ResolutionResult::NoActiveAppStoreSubscription);
        };

        let ids = BTreeSet::from([entitlement.product_identifier.clone()]);
        let products = self.client.fetch_products(&ids).await;

        let Some(product) = products.into_iter().find(|p| p.has_discount(offer_id)) else {
            tracing::info!(
                product_id = %entitlement.product_identifier,
                "no product carries the requested offer"
            );
            return Ok(ResolutionResult::NoMatchingProduct);
        };

        let Some(discount) = product.discount_for(offer_id).cloned() else {
            return Ok(ResolutionResult::NoMatchingDiscount);
        };

        let signed_offer = match self.client.sign_promotional_offer(&discount, &product).await {
            Ok(offer) => offer,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    product_id = %product.identifier,
                    "failed to sign promotional offer"
                );
                return Ok(ResolutionResult::OfferSigningFailed(e));
            }
        };

        if !signed_offer.belongs_to(&product) {
            let error = SigningError::Store(format!(
                "offer signed for {} instead of {}",
                signed_offer.product_identifier(),
                product.identifier
            ));
            tracing::warn!(error = %error, "signed offer does not match the product");
            return Ok(ResolutionResult::OfferSigningFailed(error));
        }

        tracing::debug!(product_id = %product.identifier, "promotional offer resolved");
        Ok(ResolutionResult::Resolved(ResolvedOffer {
            product,
            signed_offer,
        }))
    }

    /// Purchase `product` with `signed_offer`.
    ///
    /// Rejects offers signed for a different product without calling the SDK.
    #[tracing::instrument(skip_all, fields(product_id = %product.identifier))]
    pub async fn purchase(
        &self,
        product: &StoreProduct,
        signed_offer: &SignedPromotionalOffer,
    ) -> PurchaseOutcome {
        if !signed_offer.belongs_to(product) {
            return Err(PurchaseError::OfferMismatch {
                product: product.identifier.clone(),
                offer_product: signed_offer.product_identifier().clone(),
            });
        }

        match self.client.purchase(product, signed_offer).await {
            Ok(transaction) => {
                tracing::info!(
                    transaction_id = %transaction.transaction_identifier,
                    "promotional offer purchased"
                );
                Ok(transaction)
            }
            Err(e) => {
                if e.is_user_cancelled() {
                    tracing::info!("promotional offer purchase cancelled by user");
                } else {
                    tracing::warn!(error = %e, "promotional offer purchase failed");
                }
                Err(e)
            }
        }
    }

    /// Purchase a resolved offer, consuming it.
    pub async fn purchase_resolved(&self, resolved: ResolvedOffer) -> PurchaseOutcome {
        self.purchase(&resolved.product, &resolved.signed_offer).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use customercenter_core::{EntitlementKey, ProductIdentifier, Store};
    use customercenter_store::{
        Discount, EntitlementInfo, EntitlementSnapshot, PaymentMode, RefundRequestStatus,
        SubscriptionPeriod,
    };

    use super::*;
    use crate::client::SignedOfferData;

    /// Purchase client answering from fixed data.
    pub struct ScriptedClient {
        pub entitlements: Result<EntitlementSnapshot, CustomerInfoError>,
        pub products: Vec<StoreProduct>,
        pub signing_error: Option<SigningError>,
        /// Sign for this product instead of the one asked about.
        pub sign_for: Option<ProductIdentifier>,
        pub purchase_error: Option<PurchaseError>,
        pub requested_products: Mutex<Vec<BTreeSet<ProductIdentifier>>>,
        pub sign_calls: AtomicUsize,
        pub purchase_calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub fn new(entitlements: EntitlementSnapshot, products: Vec<StoreProduct>) -> Self {
            Self {
                entitlements: Ok(entitlements),
                products,
                signing_error: None,
                sign_for: None,
                purchase_error: None,
                requested_products: Mutex::new(Vec::new()),
                sign_calls: AtomicUsize::new(0),
                purchase_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PurchaseClient for ScriptedClient {
        async fn fetch_entitlements(&self) -> Result<EntitlementSnapshot, CustomerInfoError> {
            self.entitlements.clone()
        }

        async fn fetch_products(&self, ids: &BTreeSet<ProductIdentifier>) -> Vec<StoreProduct> {
            self.requested_products.lock().unwrap().push(ids.clone());
            self.products
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
            self.sign_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = &self.signing_error {
                return Err(e.clone());
            }
            Ok(SignedPromotionalOffer::new(
                discount.clone(),
                self.sign_for.clone().unwrap_or_else(|| product.identifier.clone()),
                SignedOfferData {
                    key_identifier: "KEY123".to_string(),
                    nonce: Uuid::now_v7(),
                    signature: "sig".to_string(),
                    timestamp: Utc::now(),
                },
            ))
        }

        async fn purchase(
            &self,
            product: &StoreProduct,
            offer: &SignedPromotionalOffer,
        ) -> Result<TransactionRecord, PurchaseError> {
            self.purchase_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = &self.purchase_error {
                return Err(e.clone());
            }
            Ok(TransactionRecord {
                transaction_identifier: "txn-1".to_string(),
                product_identifier: product.identifier.clone(),
                offer_identifier: offer.offer_identifier().cloned(),
                purchase_date: Utc::now(),
            })
        }

        async fn restore_purchases(&self) -> Result<EntitlementSnapshot, CustomerInfoError> {
            self.entitlements.clone()
        }

        async fn begin_refund_request(
            &self,
            _product_id: &ProductIdentifier,
        ) -> RefundRequestStatus {
            RefundRequestStatus::Success
        }
    }

    pub fn offer(id: &str) -> OfferIdentifier {
        OfferIdentifier::new(id).unwrap()
    }

    pub fn product_id(id: &str) -> ProductIdentifier {
        ProductIdentifier::new(id).unwrap()
    }

    pub fn entitlement(key: &str, store: Store, product: &str) -> EntitlementInfo {
        EntitlementInfo::active(EntitlementKey::new(key).unwrap(), store, product_id(product))
    }

    pub fn winback(id: &str, price: &str) -> Discount {
        Discount::new(
            Some(offer(id)),
            PaymentMode::PayAsYouGo,
            3,
            SubscriptionPeriod::monthly(),
            price,
        )
    }

    pub fn product(id: &str, discounts: Vec<Discount>) -> StoreProduct {
        let mut product = StoreProduct::new(product_id(id), "Pro", "$9.99")
            .with_period(SubscriptionPeriod::monthly());
        product.discounts = discounts;
        product
    }

    /// The canonical scenario: one App Store "pro" entitlement whose product
    /// carries `winback_50`.
    pub fn pro_client() -> ScriptedClient {
        ScriptedClient::new(
            EntitlementSnapshot::new().with(entitlement("pro", Store::AppStore, "com.app.pro")),
            vec![product("com.app.pro", vec![winback("winback_50", "$4.99")])],
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use customercenter_core::Store;
    use customercenter_store::EntitlementSnapshot;

    use super::test_support::*;
    use super::*;

    fn resolver(client: ScriptedClient) -> (PromotionalOfferResolver, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        (PromotionalOfferResolver::new(client.clone()), client)
    }

    #[tokio::test]
    async fn resolves_offer_for_app_store_entitlement() {
        let (resolver, client) = resolver(pro_client());

        let result = resolver.resolve(&offer("winback_50")).await.unwrap();
        let resolved = result.into_resolved().expect("expected Resolved");

        assert_eq!(resolved.product().identifier, "com.app.pro");
        assert!(resolved.signed_offer().belongs_to(resolved.product()));
        assert_eq!(resolved.signed_offer().offer_identifier(), Some(&offer("winback_50")));
        assert_eq!(resolved.signed_offer().discount().localized_price_string, "$4.99");
        assert_eq!(client.sign_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_offer_is_no_matching_product() {
        let (resolver, client) = resolver(pro_client());

        let result = resolver.resolve(&offer("nonexistent_offer")).await.unwrap();
        assert_eq!(result, ResolutionResult::NoMatchingProduct);
        assert_eq!(client.sign_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn play_store_entitlement_is_not_eligible() {
        let (resolver, client) = resolver(ScriptedClient::new(
            EntitlementSnapshot::new().with(entitlement("pro", Store::PlayStore, "com.app.pro")),
            vec![product("com.app.pro", vec![winback("winback_50", "$4.99")])],
        ));

        let result = resolver.resolve(&offer("winback_50")).await.unwrap();
        assert_eq!(result, ResolutionResult::NoActiveAppStoreSubscription);
        assert!(client.requested_products.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookup_is_confined_to_the_entitlement_product() {
        let (resolver, client) = resolver(ScriptedClient::new(
            EntitlementSnapshot::new().with(entitlement("pro", Store::AppStore, "com.app.pro")),
            vec![
                product("com.app.pro", vec![]),
                product("com.app.other", vec![winback("X", "$1.99")]),
            ],
        ));

        let result = resolver.resolve(&offer("X")).await.unwrap();
        assert_eq!(result, ResolutionResult::NoMatchingProduct);

        let requested = client.requested_products.lock().unwrap();
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0], BTreeSet::from([product_id("com.app.pro")]));
    }

    #[tokio::test]
    async fn first_app_store_entitlement_wins() {
        let (resolver, client) = resolver(ScriptedClient::new(
            EntitlementSnapshot::new()
                .with(entitlement("web", Store::Stripe, "web.pro"))
                .with(entitlement("pro", Store::AppStore, "com.app.pro"))
                .with(entitlement("plus", Store::AppStore, "com.app.plus")),
            vec![
                product("com.app.pro", vec![winback("winback_50", "$4.99")]),
                product("com.app.plus", vec![winback("winback_50", "$2.99")]),
            ],
        ));

        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();
        assert_eq!(resolved.product().identifier, "com.app.pro");
        assert_eq!(client.requested_products.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_offer_ids_pick_first_discount() {
        let (resolver, _) = resolver(ScriptedClient::new(
            EntitlementSnapshot::new().with(entitlement("pro", Store::AppStore, "com.app.pro")),
            vec![product(
                "com.app.pro",
                vec![winback("winback_50", "$4.99"), winback("winback_50", "$0.99")],
            )],
        ));

        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();
        assert_eq!(resolved.signed_offer().discount().localized_price_string, "$4.99");
    }

    #[tokio::test]
    async fn customer_info_failures_are_returned_unchanged() {
        let mut unconfigured = pro_client();
        unconfigured.entitlements = Err(CustomerInfoError::ClientUnconfigured);
        let (resolver, client) = resolver(unconfigured);

        let err = resolver.resolve(&offer("winback_50")).await.unwrap_err();
        assert_eq!(err, CustomerInfoError::ClientUnconfigured);
        assert!(client.requested_products.lock().unwrap().is_empty());

        let mut offline = pro_client();
        offline.entitlements = Err(CustomerInfoError::Network("timed out".into()));
        let (resolver, _) = self::resolver(offline);
        assert_eq!(
            resolver.resolve(&offer("winback_50")).await.unwrap_err(),
            CustomerInfoError::Network("timed out".into())
        );
    }

    #[tokio::test]
    async fn signing_failure_is_surfaced_without_retry() {
        let mut failing = pro_client();
        failing.signing_error = Some(SigningError::Ineligible(offer("winback_50")));
        let (resolver, client) = resolver(failing);

        let result = resolver.resolve(&offer("winback_50")).await.unwrap();
        assert_eq!(
            result,
            ResolutionResult::OfferSigningFailed(SigningError::Ineligible(offer("winback_50")))
        );
        assert_eq!(result.kind(), "offer_signing_failed");
        assert_eq!(client.sign_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn offer_signed_for_another_product_is_a_signing_failure() {
        let mut crossed = pro_client();
        crossed.sign_for = Some(product_id("com.app.other"));
        let (resolver, client) = resolver(crossed);

        let result = resolver.resolve(&offer("winback_50")).await.unwrap();
        match &result {
            ResolutionResult::OfferSigningFailed(SigningError::Store(msg)) => {
                assert!(msg.contains("com.app.other"));
                assert!(msg.contains("com.app.pro"));
            }
            other => panic!("expected OfferSigningFailed, got {other:?}"),
        }
        assert_eq!(client.purchase_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn entitlement_product_missing_from_catalog_is_no_matching_product() {
        let (resolver, client) = resolver(ScriptedClient::new(
            EntitlementSnapshot::new().with(entitlement("pro", Store::AppStore, "com.app.pro")),
            vec![],
        ));

        let result = resolver.resolve(&offer("winback_50")).await.unwrap();
        assert_eq!(result, ResolutionResult::NoMatchingProduct);
        assert_eq!(client.requested_products.lock().unwrap().len(), 1);
        assert_eq!(client.sign_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolve_is_idempotent_per_variant() {
        let (resolver, _) = resolver(pro_client());

        let first = resolver.resolve(&offer("winback_50")).await.unwrap().into_resolved().unwrap();
        let second = resolver.resolve(&offer("winback_50")).await.unwrap().into_resolved().unwrap();

        assert_eq!(first.product(), second.product());
        assert_eq!(first.signed_offer().discount(), second.signed_offer().discount());
        // Tokens are minted per attempt.
        assert_ne!(
            first.signed_offer().signed_data().nonce,
            second.signed_offer().signed_data().nonce
        );
    }

    #[tokio::test]
    async fn concurrent_resolves_are_independent() {
        let (resolver, _) = resolver(pro_client());

        let winback = offer("winback_50");
        let missing = offer("missing");
        let (a, b) = tokio::join!(resolver.resolve(&winback), resolver.resolve(&missing));

        assert!(a.unwrap().is_resolved());
        assert_eq!(b.unwrap(), ResolutionResult::NoMatchingProduct);
    }

    #[tokio::test]
    async fn purchase_delegates_to_client() {
        let (resolver, client) = resolver(pro_client());
        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();

        let txn = resolver.purchase_resolved(resolved).await.unwrap();
        assert_eq!(txn.product_identifier, "com.app.pro");
        assert_eq!(txn.offer_identifier, Some(offer("winback_50")));
        assert_eq!(client.purchase_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn purchase_errors_pass_through() {
        let mut declined = pro_client();
        declined.purchase_error = Some(PurchaseError::UserCancelled);
        let (resolver, _) = resolver(declined);
        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();

        let err = resolver
            .purchase(resolved.product(), resolved.signed_offer())
            .await
            .unwrap_err();
        assert!(err.is_user_cancelled());
    }

    #[tokio::test]
    async fn purchase_rejects_offer_signed_for_another_product() {
        let (resolver, client) = resolver(pro_client());
        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();
        let other = product("com.app.other", vec![]);

        let err = resolver.purchase(&other, resolved.signed_offer()).await.unwrap_err();
        assert_eq!(
            err,
            PurchaseError::OfferMismatch {
                product: product_id("com.app.other"),
                offer_product: product_id("com.app.pro"),
            }
        );
        assert_eq!(client.purchase_calls.load(Ordering::SeqCst), 0);
        assert!(ResolvedOffer::pair(other, resolved.signed_offer().clone()).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn non_app_store() -> impl Strategy<Value = Store> {
            prop_oneof![
                Just(Store::MacAppStore),
                Just(Store::PlayStore),
                Just(Store::Stripe),
                Just(Store::Promotional),
                Just(Store::Amazon),
                Just(Store::Unknown),
            ]
        }

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread().build().unwrap()
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: without an App Store entitlement nothing resolves,
            /// whatever the offer id.
            #[test]
            fn no_app_store_entitlement_never_resolves(
                offer_id in "[a-z][a-z0-9_]{0,20}",
                stores in proptest::collection::vec(non_app_store(), 0..5),
            ) {
                let snapshot: EntitlementSnapshot = stores
                    .iter()
                    .enumerate()
                    .map(|(i, store)| entitlement(&format!("e{i}"), *store, "com.app.pro"))
                    .collect();
                let client = ScriptedClient::new(
                    snapshot,
                    vec![product("com.app.pro", vec![winback(&offer_id, "$1.00")])],
                );
                let resolver = PromotionalOfferResolver::new(Arc::new(client));

                let result = runtime().block_on(resolver.resolve(&offer(&offer_id))).unwrap();
                prop_assert_eq!(result, ResolutionResult::NoActiveAppStoreSubscription);
            }

            /// Property: an offer id carried by no discount is never matched.
            #[test]
            fn unmatched_offer_id_is_no_matching_product(
                requested in "[a-z]{1,12}",
                carried in proptest::collection::vec("[A-Z]{1,12}", 0..4),
            ) {
                let discounts = carried.iter().map(|id| winback(id, "$1.00")).collect();
                let client = ScriptedClient::new(
                    EntitlementSnapshot::new()
                        .with(entitlement("pro", Store::AppStore, "com.app.pro")),
                    vec![product("com.app.pro", discounts)],
                );
                let resolver = PromotionalOfferResolver::new(Arc::new(client));

                let result = runtime().block_on(resolver.resolve(&offer(&requested))).unwrap();
                prop_assert_eq!(result, ResolutionResult::NoMatchingProduct);
            }
        }
    }
}
