//! Purchase client adapters.
//!
//! The real SDK binding lives in the host app; this module provides the
//! in-memory client used by tests and the demo binary.

pub mod in_memory;

pub use in_memory::{InMemoryPurchaseClient, StoreFixture};
