//! Error handling for catalog operations.

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::PlantId;

/// A draft failed checks before any request was sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("a plant name is required")]
    MissingName,
    #[error("a price is required")]
    MissingPrice,
    #[error("price '{0}' is not a number")]
    InvalidPrice(String),
    #[error("price must not be negative")]
    NegativePrice,
    #[error("no edit in progress")]
    NoEditInProgress,
    #[error("no plant with id {0} in the catalog")]
    UnknownPlant(PlantId),
}

/// Errors talking to the record store.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// The request could not be completed.
    #[error("could not reach the record store")]
    Transport(#[source] reqwest::Error),
    /// Same as [RecordStoreError::Transport] but without an underlying
    /// `reqwest` error, used by the mock client.
    #[error("could not reach the record store: {0}")]
    TransportFailure(String),
    /// The record store answered with a non-2xx status.
    #[error("{}", fmt_service_error(*.status, .detail.as_deref()))]
    Service {
        status: StatusCode,
        detail: Option<String>,
    },
    /// A 2xx response whose body is not what the operation expects.
    #[error("record store sent an unexpected response")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("invalid record store configuration: {0}")]
    InvalidConfig(String),
}

impl RecordStoreError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RecordStoreError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

fn fmt_service_error(status: StatusCode, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("record store responded with {status}: {detail}"),
        None => format!("record store responded with {status}"),
    }
}

/// Any failure of a [crate::CatalogManager] operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    RecordStore(#[from] RecordStoreError),
}

/// Displays and formats a chain of errors connected via their `source` attribute.
pub fn display_chain(mut err: &dyn std::error::Error) -> String {
    let mut fmt = err.to_string();
    while let Some(source) = err.source() {
        fmt = format!("{fmt}: {source}");
        err = source;
    }

    fmt
}
