//! Configuration loading.
//!
//! The Customer Center config is the dashboard JSON payload. Locally it is
//! read from a file whose path comes from the environment.

use std::path::Path;

use anyhow::{Context, Result};

use customercenter_center::CustomerCenterConfig;

use crate::purchase_client::StoreFixture;

/// Path of the Customer Center config JSON.
pub const CONFIG_PATH_ENV: &str = "CUSTOMER_CENTER_CONFIG";

/// Path of a store fixture used to seed the in-memory purchase client.
pub const FIXTURE_PATH_ENV: &str = "CUSTOMER_CENTER_FIXTURE";

pub fn load_config(path: impl AsRef<Path>) -> Result<CustomerCenterConfig> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading customer center config from {}", path.display()))?;
    let config = CustomerCenterConfig::from_json(&json)
        .with_context(|| format!("parsing customer center config {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        screens = config.screens.len(),
        "loaded customer center config"
    );
    Ok(config)
}

pub fn load_config_from_env() -> Result<CustomerCenterConfig> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .with_context(|| format!("{CONFIG_PATH_ENV} must be set"))?;
    load_config(path)
}

pub fn load_fixture(path: impl AsRef<Path>) -> Result<StoreFixture> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading store fixture from {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing store fixture {}", path.display()))
}
