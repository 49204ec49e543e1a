//! Client for the record store serving the plant collection.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::RecordStoreConfig;
use crate::error::RecordStoreError;
use crate::mock::MockClient;
use crate::types::{NewPlant, Plant, PlantId, PlantPatch};

const PLANTS_COLLECTION: &str = "plants";

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// The record store interface used by [crate::CatalogManager].
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the record store via [`RecordStoreClient`]
/// - **Mock**: queued canned responses via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// `GET /plants`
    async fn list_plants(&self) -> Result<Vec<Plant>, RecordStoreError>;

    /// `POST /plants`, returns the created record with its assigned id.
    async fn create_plant(&self, plant: &NewPlant) -> Result<Plant, RecordStoreError>;

    /// `PATCH /plants/{id}`, returns whatever fields the store sent back.
    async fn update_plant(
        &self,
        id: &PlantId,
        patch: &PlantPatch,
    ) -> Result<PlantPatch, RecordStoreError>;

    /// `DELETE /plants/{id}`
    async fn delete_plant(&self, id: &PlantId) -> Result<(), RecordStoreError>;
}

/// Either a client for an actual record store,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Http(RecordStoreClient),
    Mock(MockClient),
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// A client for the record store.
///
/// Handles:
/// - HTTP client configuration with timeouts
/// - Optional bearer token and extra headers
/// - Mapping of transport failures, error statuses and unexpected bodies
///   onto [RecordStoreError]
pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: Url,
    config: RecordStoreConfig,
}

impl Debug for RecordStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStoreClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl RecordStoreClient {
    /// Create a new record store client from configuration.
    pub fn new(config: RecordStoreConfig) -> Result<Self, RecordStoreError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            RecordStoreError::InvalidConfig(format!("invalid base url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RecordStoreError::InvalidConfig(format!(
                "base url '{}' cannot have a path",
                config.base_url
            )));
        }

        let http = build_http_client(&config)?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// URL of the collection, or of a single record if `id` is given.
    fn endpoint(&self, id: Option<&PlantId>) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects URLs that cannot be a base
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(PLANTS_COLLECTION);
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        url
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RecordStoreError> {
        let response = request.send().await.map_err(RecordStoreError::Transport)?;

        let status = response.status();
        debug!(%status, url = %response.url(), "received record store response");

        if status.is_success() {
            return Ok(response);
        }

        Err(service_error(response).await)
    }
}

impl ClientTrait for RecordStoreClient {
    #[instrument(skip_all)]
    async fn list_plants(&self) -> Result<Vec<Plant>, RecordStoreError> {
        let response = self.send(self.http.get(self.endpoint(None))).await?;
        let plants = decode_plant_list(read_json(response).await?)?;

        debug!(n_plants = plants.len(), "received plant list");
        Ok(plants)
    }

    #[instrument(skip_all, fields(name = %plant.name))]
    async fn create_plant(&self, plant: &NewPlant) -> Result<Plant, RecordStoreError> {
        let response = self
            .send(self.http.post(self.endpoint(None)).json(plant))
            .await?;
        let created: Plant = read_json(response).await?;

        debug!(id = %created.id, "plant created");
        Ok(created)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update_plant(
        &self,
        id: &PlantId,
        patch: &PlantPatch,
    ) -> Result<PlantPatch, RecordStoreError> {
        let response = self
            .send(self.http.patch(self.endpoint(Some(id))).json(patch))
            .await?;
        let body = response.bytes().await.map_err(RecordStoreError::Transport)?;

        // Some stores acknowledge a PATCH without echoing the record.
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!("empty update response");
            return Ok(PlantPatch::default());
        }

        serde_json::from_slice(&body).map_err(RecordStoreError::MalformedResponse)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete_plant(&self, id: &PlantId) -> Result<(), RecordStoreError> {
        self.send(self.http.delete(self.endpoint(Some(id)))).await?;

        debug!("plant deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RecordStoreError> {
    let body = response.bytes().await.map_err(RecordStoreError::Transport)?;
    serde_json::from_slice(&body).map_err(RecordStoreError::MalformedResponse)
}

/// Read a plant list, skipping entries that are not plants.
///
/// Only a body that is not a list at all is malformed.
pub(crate) fn decode_plant_list(body: Value) -> Result<Vec<Plant>, RecordStoreError> {
    let entries: Vec<Value> =
        serde_json::from_value(body).map_err(RecordStoreError::MalformedResponse)?;
    let total = entries.len();

    let plants: Vec<Plant> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Plant>(entry) {
            Ok(plant) => Some(plant),
            Err(e) => {
                debug!(error = %e, "skipping record that is not a plant");
                None
            },
        })
        .collect();

    if plants.len() < total {
        warn!(
            skipped = total - plants.len(),
            total, "plant list contains records that are not plants, skipping them"
        );
    }

    Ok(plants)
}

/// Error bodies are not standardized across record stores,
/// pick up the most common field names.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message", alias = "error")]
    detail: String,
}

async fn service_error(response: reqwest::Response) -> RecordStoreError {
    let status = response.status();

    // The body may be HTML or empty, in which case only the status is reported.
    let detail = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .map(|body| body.detail),
        Err(e) => {
            debug!(error = %e, "failed to read error response body");
            None
        },
    };

    RecordStoreError::Service { status, detail }
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build HTTP client with default headers and timeouts for the record store.
fn build_http_client(config: &RecordStoreConfig) -> Result<reqwest::Client, RecordStoreError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    if let Some(token) = &config.token {
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("bearer {token}"))
                .map_err(|e| RecordStoreError::InvalidConfig(e.to_string()))?,
        );
    }

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| {
                    RecordStoreError::InvalidConfig(e.to_string())
                },
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| {
                    RecordStoreError::InvalidConfig(e.to_string())
                },
            )?,
        );
    }

    debug!(
        base_url = %config.base_url,
        has_token = config.token.is_some(),
        extra_headers = config.extra_headers.len(),
        "building record store HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| RecordStoreError::InvalidConfig(e.to_string()))
}
