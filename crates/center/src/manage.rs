//! Manage-subscriptions flow: help paths, feedback survey, offers, refunds.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use customercenter_core::{OfferIdentifier, OptionId, PathId, ProductIdentifier};
use customercenter_events::EventBus;
use customercenter_offers::{
    OfferSession, PromotionalOfferResolver, PurchaseClient, PurchaseOutcome, ResolutionResult,
};
use customercenter_store::{EntitlementSnapshot, RefundRequestStatus};

use crate::config::{
    Appearance, FeedbackSurvey, HelpPath, HelpPathType, PromotionalOfferConfig, Screen,
    SupportConfig,
};
use crate::error::CenterError;
use crate::events::CustomerCenterEvent;
use crate::subscription::SubscriptionInformation;
use crate::support::contact_support_url;

/// Where the screen is running. Mac Catalyst only supports refund requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    MacCatalyst,
}

/// Side effect the host app must carry out for a help path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathAction {
    /// Open the store's subscription management sheet.
    ShowManageSubscriptions,
    RestorePurchases,
    BeginRefundRequest { product_id: ProductIdentifier },
    Nothing,
}

/// What the UI should do next after a tap.
#[derive(Debug)]
pub enum FlowStep {
    ShowFeedbackSurvey(FeedbackSurvey),
    ShowPromotionalOffer(OfferSession),
    Perform(PathAction),
}

#[derive(Debug, Clone)]
struct ActiveSurvey {
    path_id: PathId,
    survey: FeedbackSurvey,
}

/// State behind the management screen.
///
/// Owned by one UI flow; methods take `&mut self` and each one awaits the
/// purchase client at most a couple of times.
pub struct ManageSubscriptions<B> {
    screen: Screen,
    appearance: Appearance,
    support: SupportConfig,
    resolver: PromotionalOfferResolver,
    bus: Arc<B>,
    loaded: bool,
    subscription: Option<SubscriptionInformation>,
    refund_status: Option<RefundRequestStatus>,
    loading_path: Option<PathId>,
    active_survey: Option<ActiveSurvey>,
}

impl<B> ManageSubscriptions<B>
where
    B: EventBus<CustomerCenterEvent>,
{
    pub fn new(
        screen: Screen,
        appearance: Appearance,
        support: SupportConfig,
        resolver: PromotionalOfferResolver,
        bus: Arc<B>,
    ) -> Self {
        Self {
            screen,
            appearance,
            support,
            resolver,
            bus,
            loaded: false,
            subscription: None,
            refund_status: None,
            loading_path: None,
            active_survey: None,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn subscription_information(&self) -> Option<&SubscriptionInformation> {
        self.subscription.as_ref()
    }

    pub fn refund_request_status_message(&self) -> Option<&'static str> {
        self.refund_status.map(|s| s.message())
    }

    /// Path currently being processed; its button shows a spinner.
    pub fn loading_path(&self) -> Option<&PathId> {
        self.loading_path.as_ref()
    }

    pub fn active_survey(&self) -> Option<&FeedbackSurvey> {
        self.active_survey.as_ref().map(|a| &a.survey)
    }

    fn client(&self) -> &Arc<dyn PurchaseClient> {
        self.resolver.client()
    }

    fn publish(&self, event: CustomerCenterEvent) {
        if let Err(e) = self.bus.publish(event) {
            tracing::warn!(error = ?e, "failed to publish customer center event");
        }
    }

    /// Paths to render as buttons on `platform`.
    pub fn visible_paths(&self, platform: Platform) -> Vec<&HelpPath> {
        self.screen
            .paths
            .iter()
            .filter(|path| match platform {
                Platform::Ios => true,
                Platform::MacCatalyst => path.path_type == HelpPathType::RefundRequest,
            })
            .collect()
    }

    /// Fetch entitlements and the current product to fill the details block.
    ///
    /// An App Store entitlement is preferred; otherwise the first active one
    /// is shown. No active entitlement leaves the details empty.
    #[tracing::instrument(skip_all)]
    pub async fn load_screen(&mut self) -> Result<(), CenterError> {
        let entitlements = self.client().fetch_entitlements().await?;
        self.apply_entitlements(&entitlements).await;
        self.loaded = true;

        self.publish(CustomerCenterEvent::ScreenLoaded {
            has_active_subscription: self.subscription.is_some(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    async fn apply_entitlements(&mut self, entitlements: &EntitlementSnapshot) {
        let entitlement = entitlements
            .first_offer_eligible()
            .or_else(|| entitlements.active().next());

        let subscription = match entitlement {
            Some(entitlement) => {
                let ids = BTreeSet::from([entitlement.product_identifier.clone()]);
                let products = self.client().fetch_products(&ids).await;
                let product = products
                    .iter()
                    .find(|p| p.identifier == entitlement.product_identifier);
                if product.is_none() {
                    tracing::debug!(
                        product_id = %entitlement.product_identifier,
                        "product not in store catalog"
                    );
                }
                Some(SubscriptionInformation::new(entitlement, product))
            }
            None => None,
        };
        self.subscription = subscription;
    }

    /// React to a tap on help path `path_id`.
    #[tracing::instrument(skip(self))]
    pub async fn determine_flow(&mut self, path_id: &PathId) -> Result<FlowStep, CenterError> {
        let path = self
            .screen
            .path(path_id)
            .cloned()
            .ok_or_else(|| CenterError::UnknownPath(path_id.clone()))?;

        self.publish(CustomerCenterEvent::PathSelected {
            path_id: path.id.clone(),
            path_type: path.path_type,
            occurred_at: Utc::now(),
        });

        if let Some(survey) = path.feedback_survey {
            self.active_survey = Some(ActiveSurvey {
                path_id: path.id.clone(),
                survey: survey.clone(),
            });
            self.publish(CustomerCenterEvent::FeedbackSurveyShown {
                path_id: path.id,
                occurred_at: Utc::now(),
            });
            return Ok(FlowStep::ShowFeedbackSurvey(survey));
        }

        self.loading_path = Some(path.id.clone());
        let step = self.offer_or_action(path.promotional_offer.as_ref(), &path.id).await;
        self.loading_path = None;
        step
    }

    /// React to an answer in the active feedback survey.
    #[tracing::instrument(skip(self))]
    pub async fn select_survey_option(
        &mut self,
        option_id: &OptionId,
    ) -> Result<FlowStep, CenterError> {
        let active = self.active_survey.as_ref().ok_or(CenterError::NoActiveSurvey)?;
        let option = active
            .survey
            .option(option_id)
            .cloned()
            .ok_or_else(|| CenterError::UnknownOption(option_id.clone()))?;
        let path_id = active.path_id.clone();

        // Answering closes the survey.
        self.active_survey = None;
        self.publish(CustomerCenterEvent::SurveyOptionSelected {
            path_id: path_id.clone(),
            option_id: option.id,
            occurred_at: Utc::now(),
        });

        self.loading_path = Some(path_id.clone());
        let step = self.offer_or_action(option.promotional_offer.as_ref(), &path_id).await;
        self.loading_path = None;
        step
    }

    /// The survey was closed without an answer.
    pub fn dismiss_survey(&mut self) {
        self.active_survey = None;
    }

    async fn offer_or_action(
        &self,
        offer: Option<&PromotionalOfferConfig>,
        path_id: &PathId,
    ) -> Result<FlowStep, CenterError> {
        if let Some(offer_id) = offer.and_then(PromotionalOfferConfig::eligible_offer) {
            if let Some(session) = self.open_offer(offer_id).await {
                return Ok(FlowStep::ShowPromotionalOffer(session));
            }
        }
        Ok(FlowStep::Perform(self.action_for(path_id)?))
    }

    /// Resolve `offer_id`; any failure hides the offer and is reported as an
    /// event.
    async fn open_offer(&self, offer_id: &OfferIdentifier) -> Option<OfferSession> {
        let reason = match self.resolver.resolve(offer_id).await {
            Ok(ResolutionResult::Resolved(resolved)) => {
                self.publish(CustomerCenterEvent::PromotionalOfferShown {
                    offer_id: offer_id.clone(),
                    product_id: resolved.product().identifier.clone(),
                    occurred_at: Utc::now(),
                });
                return Some(OfferSession::new(resolved));
            }
            Ok(other) => other.kind().to_string(),
            Err(e) => e.to_string(),
        };

        self.publish(CustomerCenterEvent::PromotionalOfferUnavailable {
            offer_id: offer_id.clone(),
            reason,
            occurred_at: Utc::now(),
        });
        None
    }

    /// Action for a path once offers and surveys are out of the way.
    pub fn action_for(&self, path_id: &PathId) -> Result<PathAction, CenterError> {
        let path = self
            .screen
            .path(path_id)
            .ok_or_else(|| CenterError::UnknownPath(path_id.clone()))?;

        Ok(match path.path_type {
            HelpPathType::Cancel | HelpPathType::ChangePlans => PathAction::ShowManageSubscriptions,
            HelpPathType::MissingPurchase => PathAction::RestorePurchases,
            HelpPathType::RefundRequest => {
                let subscription = self
                    .subscription
                    .as_ref()
                    .ok_or(CenterError::NoActiveSubscription)?;
                PathAction::BeginRefundRequest {
                    product_id: subscription.product_identifier.clone(),
                }
            }
            HelpPathType::Unknown => PathAction::Nothing,
        })
    }

    /// Purchase the offer on screen.
    ///
    /// On success the details block is refreshed from the new entitlements.
    pub async fn accept_offer(&mut self, session: OfferSession) -> PurchaseOutcome {
        let product_id = session.product().identifier.clone();
        let outcome = session.accept(&self.resolver).await;

        match &outcome {
            Ok(transaction) => {
                self.publish(CustomerCenterEvent::PromotionalOfferAccepted {
                    product_id,
                    transaction_id: transaction.transaction_identifier.clone(),
                    occurred_at: Utc::now(),
                });
                let refreshed = self.client().fetch_entitlements().await;
                match refreshed {
                    Ok(entitlements) => self.apply_entitlements(&entitlements).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "could not refresh entitlements after purchase")
                    }
                }
            }
            Err(e) => self.publish(CustomerCenterEvent::PromotionalOfferPurchaseFailed {
                product_id,
                error: e.to_string(),
                occurred_at: Utc::now(),
            }),
        }
        outcome
    }

    /// The offer sheet for `path_id` was dismissed without purchasing; carry
    /// on with the path's own action.
    pub fn decline_offer(
        &mut self,
        session: OfferSession,
        path_id: &PathId,
    ) -> Result<PathAction, CenterError> {
        let product_id = session.product().identifier.clone();
        session.decline();
        self.publish(CustomerCenterEvent::PromotionalOfferDeclined {
            product_id,
            occurred_at: Utc::now(),
        });
        self.action_for(path_id)
    }

    /// Carry out [`PathAction::BeginRefundRequest`].
    pub async fn request_refund(&mut self, product_id: &ProductIdentifier) -> RefundRequestStatus {
        let status = self.client().begin_refund_request(product_id).await;
        self.record_refund_status(product_id, status);
        status
    }

    pub fn record_refund_status(
        &mut self,
        product_id: &ProductIdentifier,
        status: RefundRequestStatus,
    ) {
        self.refund_status = Some(status);
        self.publish(CustomerCenterEvent::RefundStatusUpdated {
            product_id: product_id.clone(),
            status,
            occurred_at: Utc::now(),
        });
    }

    /// Carry out [`PathAction::RestorePurchases`].
    pub async fn restore_purchases(&mut self) -> Result<(), CenterError> {
        let entitlements = self.client().restore_purchases().await?;
        self.apply_entitlements(&entitlements).await;
        self.publish(CustomerCenterEvent::PurchasesRestored {
            has_active_subscription: self.subscription.is_some(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// `mailto:` link behind the "Contact support" button.
    pub fn contact_support_url(&self) -> Result<String, CenterError> {
        Ok(contact_support_url(&self.support, None, None)?)
    }
}
