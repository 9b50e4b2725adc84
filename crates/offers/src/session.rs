//! One presentation of a promotional offer.

use customercenter_core::DomainResult;
use customercenter_store::StoreProduct;

use crate::client::{PurchaseError, SignedPromotionalOffer};
use crate::presentation::OfferPresentation;
use crate::resolver::{PromotionalOfferResolver, PurchaseOutcome, ResolvedOffer};

/// A resolved offer that is currently on screen.
///
/// The signed offer lives exactly as long as the session: [`accept`] and
/// [`decline`] both consume it, so a token is never reused across attempts.
///
/// [`accept`]: OfferSession::accept
/// [`decline`]: OfferSession::decline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSession {
    resolved: ResolvedOffer,
    presentation: OfferPresentation,
}

impl OfferSession {
    pub fn new(resolved: ResolvedOffer) -> Self {
        let presentation =
            OfferPresentation::new(resolved.product(), resolved.signed_offer().discount());
        Self {
            resolved,
            presentation,
        }
    }

    /// Open a session for an offer resolved elsewhere.
    pub fn from_parts(
        product: StoreProduct,
        signed_offer: SignedPromotionalOffer,
    ) -> DomainResult<Self> {
        Ok(Self::new(ResolvedOffer::pair(product, signed_offer)?))
    }

    pub fn product(&self) -> &StoreProduct {
        self.resolved.product()
    }

    pub fn signed_offer(&self) -> &SignedPromotionalOffer {
        self.resolved.signed_offer()
    }

    pub fn presentation(&self) -> &OfferPresentation {
        &self.presentation
    }

    /// The customer took the offer.
    pub async fn accept(self, resolver: &PromotionalOfferResolver) -> PurchaseOutcome {
        resolver.purchase_resolved(self.resolved).await
    }

    /// The customer dismissed the sheet; the signed offer is dropped.
    pub fn decline(self) {
        tracing::debug!(
            product_id = %self.resolved.product().identifier,
            "promotional offer declined"
        );
    }
}

impl From<ResolvedOffer> for OfferSession {
    fn from(resolved: ResolvedOffer) -> Self {
        Self::new(resolved)
    }
}

/// Whether a failed purchase should leave the sheet up so the customer can
/// try again (they cancelled the payment sheet) or close it.
pub fn keeps_sheet_open(error: &PurchaseError) -> bool {
    error.is_user_cancelled()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::resolver::test_support::*;

    #[tokio::test]
    async fn accepted_session_purchases_its_own_pair() {
        let client = Arc::new(pro_client());
        let resolver = PromotionalOfferResolver::new(client.clone());
        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();

        let session = OfferSession::from(resolved);
        assert_eq!(session.presentation().offer_title, "$4.99/mo for 3 months");

        let txn = session.accept(&resolver).await.unwrap();
        assert_eq!(txn.product_identifier, "com.app.pro");
        assert_eq!(client.purchase_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn declined_session_never_purchases() {
        let client = Arc::new(pro_client());
        let resolver = PromotionalOfferResolver::new(client.clone());
        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();

        OfferSession::new(resolved).decline();
        assert_eq!(client.purchase_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn from_parts_rejects_mismatched_pairs() {
        let resolver = PromotionalOfferResolver::new(Arc::new(pro_client()));
        let resolved = resolver
            .resolve(&offer("winback_50"))
            .await
            .unwrap()
            .into_resolved()
            .unwrap();
        let (own_product, signed) = resolved.into_parts();

        assert!(OfferSession::from_parts(own_product, signed.clone()).is_ok());
        assert!(OfferSession::from_parts(product("com.app.other", vec![]), signed).is_err());
    }

    #[test]
    fn only_user_cancellation_keeps_the_sheet_open() {
        assert!(keeps_sheet_open(&PurchaseError::UserCancelled));
        assert!(!keeps_sheet_open(&PurchaseError::PaymentDeclined("card".into())));
    }
}
