//! Infrastructure: configuration loading, purchase client adapters, wiring.

pub mod app;
pub mod config;
pub mod purchase_client;

pub use app::{CustomerCenterApp, build_customer_center};
pub use config::{
    CONFIG_PATH_ENV, FIXTURE_PATH_ENV, load_config, load_config_from_env, load_fixture,
};
pub use purchase_client::{InMemoryPurchaseClient, StoreFixture};
