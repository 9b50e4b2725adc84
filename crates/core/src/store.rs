//! Storefronts an entitlement can originate from.

use serde::{Deserialize, Serialize};

/// Store that granted an entitlement.
///
/// Unrecognised values (new stores added server side) deserialize to
/// [`Store::Unknown`] instead of failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    AppStore,
    MacAppStore,
    PlayStore,
    Stripe,
    Promotional,
    Amazon,
    #[serde(other)]
    Unknown,
}

impl Store {
    /// Whether promotional offers can be signed for purchases from this store.
    ///
    /// Offer signing is an App Store capability; Mac App Store purchases go
    /// through a separate flow and are not eligible here.
    pub fn supports_promotional_offers(&self) -> bool {
        matches!(self, Store::AppStore)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Store::AppStore => "app_store",
            Store::MacAppStore => "mac_app_store",
            Store::PlayStore => "play_store",
            Store::Stripe => "stripe",
            Store::Promotional => "promotional",
            Store::Amazon => "amazon",
            Store::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
