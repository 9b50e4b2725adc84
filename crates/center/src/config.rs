//! Customer Center configuration as served by the dashboard.
//!
//! The payload is snake_case JSON with SCREAMING_SNAKE_CASE enum values.
//! Unknown enum values are tolerated so that older clients keep working when
//! new path types or screens are introduced.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use customercenter_core::{DomainError, DomainResult, OfferIdentifier, OptionId, PathId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCenterConfig {
    pub screens: BTreeMap<ScreenType, Screen>,
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default)]
    pub localization: Localization,
    pub support: SupportConfig,
}

impl CustomerCenterConfig {
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("customer center config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn screen(&self, screen_type: ScreenType) -> Option<&Screen> {
        self.screens.get(&screen_type)
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> DomainResult<()> {
        for (screen_type, screen) in &self.screens {
            if screen.screen_type != *screen_type {
                return Err(DomainError::validation(format!(
                    "screen stored under {screen_type:?} declares type {:?}",
                    screen.screen_type
                )));
            }
            screen.validate()?;
        }
        crate::support::support_email(&self.support.email)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenType {
    /// Shown to customers with an active subscription.
    Management,
    /// Shown when nothing is active.
    NoActive,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(rename = "type")]
    pub screen_type: ScreenType,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub paths: Vec<HelpPath>,
}

impl Screen {
    pub fn path(&self, id: &PathId) -> Option<&HelpPath> {
        self.paths.iter().find(|p| &p.id == id)
    }

    fn validate(&self) -> DomainResult<()> {
        let mut seen = BTreeSet::new();
        for path in &self.paths {
            if !seen.insert(&path.id) {
                return Err(DomainError::validation(format!("duplicate help path id {}", path.id)));
            }
            path.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HelpPathType {
    MissingPurchase,
    RefundRequest,
    ChangePlans,
    Cancel,
    #[serde(other)]
    Unknown,
}

/// An entry on a screen ("Cancel subscription", "Request a refund", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpPath {
    pub id: PathId,
    pub title: String,
    #[serde(rename = "type")]
    pub path_type: HelpPathType,
    #[serde(default)]
    pub promotional_offer: Option<PromotionalOfferConfig>,
    #[serde(default)]
    pub feedback_survey: Option<FeedbackSurvey>,
}

impl HelpPath {
    fn validate(&self) -> DomainResult<()> {
        if self.promotional_offer.is_some() && self.feedback_survey.is_some() {
            return Err(DomainError::validation(format!(
                "help path {} has both a promotional offer and a feedback survey",
                self.id
            )));
        }
        if let Some(survey) = &self.feedback_survey {
            survey.validate(&self.id)?;
        }
        Ok(())
    }
}

/// Promotional offer attached to a path or survey option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionalOfferConfig {
    pub ios_offer_id: OfferIdentifier,
    /// Dashboard-side eligibility; ineligible offers are never resolved.
    #[serde(default = "default_true")]
    pub eligible: bool,
}

fn default_true() -> bool {
    true
}

impl PromotionalOfferConfig {
    /// Offer id to resolve, if the offer may be shown at all.
    pub fn eligible_offer(&self) -> Option<&OfferIdentifier> {
        self.eligible.then_some(&self.ios_offer_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSurvey {
    pub title: String,
    pub options: Vec<SurveyOption>,
}

impl FeedbackSurvey {
    pub fn option(&self, id: &OptionId) -> Option<&SurveyOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    fn validate(&self, path_id: &PathId) -> DomainResult<()> {
        if self.options.is_empty() {
            return Err(DomainError::validation(format!(
                "feedback survey on {path_id} has no options"
            )));
        }
        let mut seen = BTreeSet::new();
        for option in &self.options {
            if !seen.insert(&option.id) {
                return Err(DomainError::validation(format!(
                    "feedback survey on {path_id} repeats option {}",
                    option.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOption {
    pub id: OptionId,
    pub title: String,
    #[serde(default)]
    pub promotional_offer: Option<PromotionalOfferConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppearanceMode {
    #[default]
    System,
    Custom,
}

/// Colors as `#RRGGBB` strings; only used in [`AppearanceMode::Custom`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(default)]
    pub mode: AppearanceMode,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localization {
    pub locale: String,
    #[serde(default)]
    pub localized_strings: HashMap<String, String>,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            locale: "en_US".to_string(),
            localized_strings: HashMap::new(),
        }
    }
}

impl Localization {
    /// Localized string for `key`, or `fallback` when the dashboard has none.
    pub fn string<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.localized_strings.get(key).map(String::as_str).unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportConfig {
    pub email: String,
}
