//! Customer Center events and the bus that distributes them.
//!
//! Screens do not expose observable state. Operations return explicit values
//! and publish events describing what happened; a UI layer subscribes and
//! re-renders with whatever reactive primitive it has.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
