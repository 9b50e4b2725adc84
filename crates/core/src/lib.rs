//! `customercenter-core`: shared building blocks for the Customer Center.
//!
//! This crate contains **pure** primitives (identifiers, store kinds, errors)
//! with no IO and no dependency on the purchase SDK.

pub mod error;
pub mod id;
pub mod store;

pub use error::{DomainError, DomainResult};
pub use id::{EntitlementKey, OfferIdentifier, OptionId, PathId, ProductIdentifier};
pub use store::Store;
