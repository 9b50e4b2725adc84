use chrono::{DateTime, Utc};
use serde::Serialize;

use customercenter_core::{OfferIdentifier, OptionId, PathId, ProductIdentifier};
use customercenter_events::Event;
use customercenter_store::RefundRequestStatus;

use crate::config::HelpPathType;

/// Everything the Customer Center reports to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomerCenterEvent {
    ScreenLoaded {
        has_active_subscription: bool,
        occurred_at: DateTime<Utc>,
    },
    PathSelected {
        path_id: PathId,
        path_type: HelpPathType,
        occurred_at: DateTime<Utc>,
    },
    FeedbackSurveyShown {
        path_id: PathId,
        occurred_at: DateTime<Utc>,
    },
    SurveyOptionSelected {
        path_id: PathId,
        option_id: OptionId,
        occurred_at: DateTime<Utc>,
    },
    PromotionalOfferShown {
        offer_id: OfferIdentifier,
        product_id: ProductIdentifier,
        occurred_at: DateTime<Utc>,
    },
    /// The offer could not be resolved; the path continues without it.
    PromotionalOfferUnavailable {
        offer_id: OfferIdentifier,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
    PromotionalOfferAccepted {
        product_id: ProductIdentifier,
        transaction_id: String,
        occurred_at: DateTime<Utc>,
    },
    PromotionalOfferPurchaseFailed {
        product_id: ProductIdentifier,
        error: String,
        occurred_at: DateTime<Utc>,
    },
    PromotionalOfferDeclined {
        product_id: ProductIdentifier,
        occurred_at: DateTime<Utc>,
    },
    RefundStatusUpdated {
        product_id: ProductIdentifier,
        status: RefundRequestStatus,
        occurred_at: DateTime<Utc>,
    },
    PurchasesRestored {
        has_active_subscription: bool,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for CustomerCenterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerCenterEvent::ScreenLoaded { .. } => "customer_center.screen.loaded",
            CustomerCenterEvent::PathSelected { .. } => "customer_center.path.selected",
            CustomerCenterEvent::FeedbackSurveyShown { .. } => "customer_center.survey.shown",
            CustomerCenterEvent::SurveyOptionSelected { .. } => {
                "customer_center.survey.option_selected"
            }
            CustomerCenterEvent::PromotionalOfferShown { .. } => "customer_center.offer.shown",
            CustomerCenterEvent::PromotionalOfferUnavailable { .. } => {
                "customer_center.offer.unavailable"
            }
            CustomerCenterEvent::PromotionalOfferAccepted { .. } => {
                "customer_center.offer.accepted"
            }
            CustomerCenterEvent::PromotionalOfferPurchaseFailed { .. } => {
                "customer_center.offer.purchase_failed"
            }
            CustomerCenterEvent::PromotionalOfferDeclined { .. } => {
                "customer_center.offer.declined"
            }
            CustomerCenterEvent::RefundStatusUpdated { .. } => {
                "customer_center.refund.status_updated"
            }
            CustomerCenterEvent::PurchasesRestored { .. } => "customer_center.purchases.restored",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CustomerCenterEvent::ScreenLoaded { occurred_at, .. }
            | CustomerCenterEvent::PathSelected { occurred_at, .. }
            | CustomerCenterEvent::FeedbackSurveyShown { occurred_at, .. }
            | CustomerCenterEvent::SurveyOptionSelected { occurred_at, .. }
            | CustomerCenterEvent::PromotionalOfferShown { occurred_at, .. }
            | CustomerCenterEvent::PromotionalOfferUnavailable { occurred_at, .. }
            | CustomerCenterEvent::PromotionalOfferAccepted { occurred_at, .. }
            | CustomerCenterEvent::PromotionalOfferPurchaseFailed { occurred_at, .. }
            | CustomerCenterEvent::PromotionalOfferDeclined { occurred_at, .. }
            | CustomerCenterEvent::RefundStatusUpdated { occurred_at, .. }
            | CustomerCenterEvent::PurchasesRestored { occurred_at, .. } => *occurred_at,
        }
    }
}
