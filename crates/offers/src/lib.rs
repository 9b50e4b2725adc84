//! Promotional (win-back) offers.
//!
//! Given an offer identifier, work out which of the customer's products it
//! applies to, obtain a signed offer for it from the purchase SDK, and hand the
//! pair back so the caller can present it and, on confirmation, purchase it.
//!
//! The purchase SDK is abstracted by [`PurchaseClient`]. This crate performs no
//! retries, no caching and no IO of its own.

pub mod client;
pub mod presentation;
pub mod resolver;
pub mod session;

pub use client::{
    CustomerInfoError, PurchaseClient, PurchaseError, SignedOfferData, SignedPromotionalOffer,
    SigningError,
};
pub use presentation::OfferPresentation;
pub use resolver::{PromotionalOfferResolver, PurchaseOutcome, ResolutionResult, ResolvedOffer};
pub use session::{OfferSession, keeps_sheet_open};
