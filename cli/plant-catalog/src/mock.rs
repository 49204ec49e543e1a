//! A record store client that answers from a queue of canned responses.
//!
//! Used by tests to drive [crate::CatalogManager] without HTTP,
//! and by the storefront binary when pointed at a mock data file.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::client::{decode_plant_list, ClientTrait};
use crate::error::RecordStoreError;
use crate::types::{NewPlant, Plant, PlantId, PlantPatch};

// Arc allows you to push things into the client from outside the client if necessary
// Mutex allows you to share across threads (necessary because of tokio)
type MockField<T> = Arc<Mutex<T>>;

/// A canned answer to the next request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum MockResponse {
    Plants(Vec<Plant>),
    Plant(Plant),
    Patch(PlantPatch),
    /// Success without a meaningful body.
    Ack,
    /// Arbitrary JSON, decoded as whatever the operation expects.
    Raw(Value),
    Error {
        status: u16,
        #[serde(default)]
        detail: Option<String>,
    },
    TransportFailure(String),
}

/// A request the mock client received.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Error)]
pub enum MockDataError {
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
}

/// A record store client that can be seeded with mock responses.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<MockResponse>>,
    calls: MockField<Vec<MockCall>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => read_mock_responses(path)?,
            None => VecDeque::new(),
        };

        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
            calls: Default::default(),
        })
    }

    /// Push a new response into the list of mock responses
    pub fn push_response(&self, response: MockResponse) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(response);
    }

    pub fn push_plants(&self, plants: Vec<Plant>) {
        self.push_response(MockResponse::Plants(plants));
    }

    pub fn push_plant(&self, plant: Plant) {
        self.push_response(MockResponse::Plant(plant));
    }

    pub fn push_patch(&self, patch: PlantPatch) {
        self.push_response(MockResponse::Patch(patch));
    }

    pub fn push_ack(&self) {
        self.push_response(MockResponse::Ack);
    }

    pub fn push_raw(&self, value: Value) {
        self.push_response(MockResponse::Raw(value));
    }

    /// Push an error status into the list of mock responses
    pub fn push_error(&self, status: u16, detail: Option<&str>) {
        self.push_response(MockResponse::Error {
            status,
            detail: detail.map(ToString::to_string),
        });
    }

    pub fn push_transport_failure(&self, message: impl Into<String>) {
        self.push_response(MockResponse::TransportFailure(message.into()));
    }

    /// All requests received so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().expect("couldn't acquire mock lock").clone()
    }

    /// Number of responses that have not been consumed yet.
    pub fn pending_responses(&self) -> usize {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .len()
    }

    fn record(&self, method: &'static str, path: String, body: Option<Value>) {
        debug!(method, path = %path, "mock record store request");
        self.calls
            .lock()
            .expect("couldn't acquire mock lock")
            .push(MockCall { method, path, body });
    }

    /// Pop the next response and decode it as `T`.
    fn respond<T: DeserializeOwned>(&self) -> Result<T, RecordStoreError> {
        let mock_resp = self
            .mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front();

        let value = match mock_resp {
            Some(MockResponse::Plants(plants)) => to_value(plants),
            Some(MockResponse::Plant(plant)) => to_value(plant),
            Some(MockResponse::Patch(patch)) => to_value(patch),
            Some(MockResponse::Ack) => Value::Null,
            Some(MockResponse::Raw(value)) => value,
            Some(MockResponse::Error { status, detail }) => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return Err(RecordStoreError::Service { status, detail });
            },
            Some(MockResponse::TransportFailure(message)) => {
                return Err(RecordStoreError::TransportFailure(message));
            },
            None => panic!("no mock response queued"),
        };

        serde_json::from_value(value).map_err(RecordStoreError::MalformedResponse)
    }
}

impl ClientTrait for MockClient {
    async fn list_plants(&self) -> Result<Vec<Plant>, RecordStoreError> {
        self.record("GET", "/plants".to_string(), None);
        self.respond::<Value>().and_then(decode_plant_list)
    }

    async fn create_plant(&self, plant: &NewPlant) -> Result<Plant, RecordStoreError> {
        self.record("POST", "/plants".to_string(), Some(to_value(plant)));
        self.respond()
    }

    async fn update_plant(
        &self,
        id: &PlantId,
        patch: &PlantPatch,
    ) -> Result<PlantPatch, RecordStoreError> {
        self.record("PATCH", format!("/plants/{id}"), Some(to_value(patch)));
        // An `Ack` stands for an empty body.
        self.respond::<Option<PlantPatch>>()
            .map(Option::unwrap_or_default)
    }

    async fn delete_plant(&self, id: &PlantId) -> Result<(), RecordStoreError> {
        self.record("DELETE", format!("/plants/{id}"), None);
        self.respond::<serde::de::IgnoredAny>().map(|_| ())
    }
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).expect("mock data is serializable")
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<MockResponse>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<MockResponse> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;
    Ok(deserialized.into())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn responses_are_served_in_order() {
        let client = MockClient::default();
        client.push_plants(vec![]);
        client.push_error(404, None);

        assert_eq!(client.list_plants().await.unwrap(), vec![]);
        let err = client.delete_plant(&PlantId::Number(1)).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(client.calls(), vec![
            MockCall {
                method: "GET",
                path: "/plants".to_string(),
                body: None,
            },
            MockCall {
                method: "DELETE",
                path: "/plants/1".to_string(),
                body: None,
            },
        ]);
        assert_eq!(client.pending_responses(), 0);
    }

    #[tokio::test]
    async fn raw_response_of_wrong_shape_is_malformed() {
        let client = MockClient::default();
        client.push_raw(json!({ "not": "a list" }));

        let result = client.list_plants().await;
        assert!(matches!(result, Err(RecordStoreError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn ack_is_an_empty_update() {
        let client = MockClient::default();
        client.push_ack();

        let patch = client
            .update_plant(&PlantId::Number(1), &PlantPatch::sold())
            .await
            .unwrap();
        assert_eq!(patch, PlantPatch::default());
        assert_eq!(client.calls()[0].body, Some(json!({ "sold": true })));
    }

    #[test]
    fn reads_responses_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            json!([
                { "kind": "plants", "body": [{ "id": 1, "name": "Aloe", "price": 15.99 }] },
                { "kind": "error", "body": { "status": 500 } },
                { "kind": "ack" },
            ])
            .to_string(),
        )
        .unwrap();

        let client = MockClient::new(Some(file.path())).unwrap();
        assert_eq!(client.pending_responses(), 3);
    }
}
