//! The Customer Center screen, minus rendering.
//!
//! Configuration comes from the dashboard as JSON ([`config`]). The
//! [`ManageSubscriptions`] flow turns taps on help paths and survey options
//! into [`FlowStep`]s for the UI, resolving promotional offers on the way, and
//! publishes a [`CustomerCenterEvent`] for everything that happens.

pub mod config;
pub mod error;
pub mod events;
pub mod manage;
pub mod subscription;
pub mod support;

pub use config::{
    Appearance, AppearanceMode, CustomerCenterConfig, FeedbackSurvey, HelpPath, HelpPathType,
    Localization, PromotionalOfferConfig, Screen, ScreenType, SupportConfig, SurveyOption,
};
pub use error::CenterError;
pub use events::CustomerCenterEvent;
pub use manage::{FlowStep, ManageSubscriptions, PathAction, Platform};
pub use subscription::SubscriptionInformation;
pub use support::contact_support_url;
