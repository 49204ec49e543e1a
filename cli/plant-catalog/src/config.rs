//! Configuration for record store client construction.

use std::collections::BTreeMap;
use std::time::Duration;

/// Where the development record store listens by default.
pub const DEFAULT_STORE_URL: &str = "http://localhost:6001";

/// Configuration for record store client construction.
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Base URL of the record store, the `/plants` collection lives below it.
    pub base_url: String,
    /// Optional bearer token sent as `authorization` header.
    pub token: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl RecordStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            token: None,
            extra_headers: BTreeMap::new(),
            user_agent: None,
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
        }
    }
}
