use chrono::{DateTime, Utc};

/// A UI-facing event.
///
/// Events are facts about something the user did or saw. They are cloned to
/// every subscriber, so keep them small.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "customer_center.offer.accepted").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}
