//! Client side state for the plant shop storefront.
//!
//! This crate provides:
//! - The plant data model and the drafts used while creating or editing
//! - An HTTP client for the record store serving the `/plants` collection
//! - A queue driven mock client for tests and offline use
//! - [`CatalogManager`], which owns the local catalog and reconciles every
//!   record store response into it
//!
//! ## Usage
//!
//! ```ignore
//! use plant_catalog::{CatalogManager, RecordStoreClient, RecordStoreConfig};
//!
//! let client = RecordStoreClient::new(RecordStoreConfig::new("http://localhost:6001"))?;
//! let mut manager = CatalogManager::new(client);
//! manager.load().await?;
//! manager.set_search_term("aloe");
//! for plant in manager.visible_plants() { ... }
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod reconcile;
mod search;
mod state;
mod types;

pub use client::{Client, ClientTrait, RecordStoreClient};
pub use config::{RecordStoreConfig, DEFAULT_STORE_URL};
pub use error::{display_chain, CatalogError, RecordStoreError, ValidationError};
pub use mock::{MockCall, MockClient, MockDataError, MockResponse};
pub use search::matches_search;
pub use state::{CatalogManager, CatalogState};
pub use types::{
    EditDraft,
    EditingPlant,
    NewPlant,
    NewPlantDraft,
    Plant,
    PlantId,
    PlantPatch,
    PLACEHOLDER_IMAGE_URL,
};
