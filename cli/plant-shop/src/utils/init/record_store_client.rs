use std::path::PathBuf;

use anyhow::{bail, Context};
use plant_catalog::{Client, MockClient, RecordStoreClient, RecordStoreConfig};
use tracing::debug;

use crate::config::Config;

/// Points the storefront at a file of canned responses instead of a record store.
pub const PLANT_SHOP_MOCK_DATA_VAR: &str = "_PLANT_SHOP_USE_MOCK";

/// Initialize the record store client
///
/// - Initialize a mock client if `_PLANT_SHOP_USE_MOCK` is set to a path to mock data
/// - Initialize a real client for the configured store otherwise
pub fn init_record_store_client(config: &Config) -> Result<Client, anyhow::Error> {
    if let Ok(path_str) = std::env::var(PLANT_SHOP_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock record store client");
        return Ok(MockClient::new(Some(path))?.into());
    }

    let store_config = RecordStoreConfig {
        token: config.store_token.clone().filter(|token| !token.is_empty()),
        user_agent: Some(
            config
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("plant-shop/{}", env!("CARGO_PKG_VERSION"))),
        ),
        ..RecordStoreConfig::new(&config.store_url)
    };

    debug!(url = %config.store_url, "using record store client");
    let client = RecordStoreClient::new(store_config)
        .with_context(|| format!("Could not use record store at '{}'", config.store_url))?;
    Ok(client.into())
}
