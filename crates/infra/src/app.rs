//! Wiring: config + purchase client + event bus into a ready screen.

use std::sync::Arc;

use anyhow::{Context, Result};

use customercenter_center::{
    CustomerCenterConfig, CustomerCenterEvent, ManageSubscriptions, ScreenType,
};
use customercenter_events::{EventBus, InMemoryEventBus, Subscription};
use customercenter_offers::{PromotionalOfferResolver, PurchaseClient};

/// A management screen wired to an in-process event bus.
pub struct CustomerCenterApp {
    pub manage: ManageSubscriptions<InMemoryEventBus<CustomerCenterEvent>>,
    pub bus: Arc<InMemoryEventBus<CustomerCenterEvent>>,
    pub resolver: PromotionalOfferResolver,
}

impl CustomerCenterApp {
    /// Subscribe to everything the screen reports from now on.
    pub fn subscribe(&self) -> Subscription<CustomerCenterEvent> {
        self.bus.subscribe()
    }
}

/// Build the management screen from `config` on top of `client`.
pub fn build_customer_center(
    config: &CustomerCenterConfig,
    client: Arc<dyn PurchaseClient>,
) -> Result<CustomerCenterApp> {
    let screen = config
        .screen(ScreenType::Management)
        .cloned()
        .context("customer center config has no MANAGEMENT screen")?;

    let resolver = PromotionalOfferResolver::new(client);
    let bus = Arc::new(InMemoryEventBus::new());
    let manage = ManageSubscriptions::new(
        screen,
        config.appearance.clone(),
        config.support.clone(),
        resolver.clone(),
        bus.clone(),
    );

    Ok(CustomerCenterApp {
        manage,
        bus,
        resolver,
    })
}
