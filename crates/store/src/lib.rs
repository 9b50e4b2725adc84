//! Store-side value types: products, discounts, entitlements, transactions.
//!
//! Everything here is a read-only snapshot handed over by the purchase SDK.
//! Nothing in this crate talks to a store.

pub mod entitlement;
pub mod period;
pub mod product;
pub mod transaction;

pub use entitlement::{EntitlementInfo, EntitlementSnapshot};
pub use period::{PeriodUnit, SubscriptionPeriod};
pub use product::{Discount, PaymentMode, StoreProduct};
pub use transaction::{RefundRequestStatus, TransactionRecord};
