//! The catalog state manager.
//!
//! [CatalogManager] owns the only in-memory copy of the catalog together
//! with the drafts, the search term and the loading/error flags.
//! Every mutation follows the same steps:
//!
//! 1. check the relevant draft (no request is sent if that fails)
//! 2. send the request and await the response
//! 3. apply the matching [reconcile] function on success
//!
//! The catalog is never changed before the record store confirmed a change.
//! Failures of any kind end up as a single user-facing message in
//! [CatalogState::last_error] and are also returned to the caller.

use tracing::{debug, instrument, warn};

use crate::client::ClientTrait;
use crate::error::{display_chain, CatalogError, RecordStoreError, ValidationError};
use crate::reconcile;
use crate::search::filter_plants;
use crate::types::{EditDraft, EditingPlant, NewPlantDraft, Plant, PlantId, PlantPatch};

/// Everything the presentation layer renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    plants: Vec<Plant>,
    new_plant: NewPlantDraft,
    edit: EditDraft,
    search_term: String,
    loading: bool,
    last_error: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            plants: Vec::new(),
            new_plant: NewPlantDraft::default(),
            edit: EditDraft::Idle,
            search_term: String::new(),
            // nothing is shown until the initial load completed
            loading: true,
            last_error: None,
        }
    }
}

impl CatalogState {
    /// The full catalog, regardless of the search term.
    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// The plants whose name contains the search term, ignoring case.
    pub fn visible_plants(&self) -> Vec<&Plant> {
        filter_plants(&self.plants, &self.search_term)
    }

    pub fn new_plant(&self) -> &NewPlantDraft {
        &self.new_plant
    }

    pub fn edit(&self) -> &EditDraft {
        &self.edit
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Mediates between the record store and the local [CatalogState].
#[derive(Debug)]
pub struct CatalogManager<C> {
    client: C,
    state: CatalogState,
}

impl<C: ClientTrait> CatalogManager<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: CatalogState::default(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn plants(&self) -> &[Plant] {
        self.state.plants()
    }

    pub fn visible_plants(&self) -> Vec<&Plant> {
        self.state.visible_plants()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    // region: local state

    /// Change what [Self::visible_plants] shows, never sends a request.
    pub fn set_search_term(&mut self, search_term: impl Into<String>) {
        self.state.search_term = search_term.into();
    }

    pub fn search_term(&self) -> &str {
        self.state.search_term()
    }

    pub fn new_plant_mut(&mut self) -> &mut NewPlantDraft {
        &mut self.state.new_plant
    }

    /// Start editing the plant with `id`, seeded with its current values.
    pub fn begin_edit(&mut self, id: &PlantId) -> Result<&mut EditingPlant, CatalogError> {
        let Some(plant) = self.state.plants.iter().find(|plant| &plant.id == id) else {
            return self.fail(
                "Could not edit plant",
                ValidationError::UnknownPlant(id.clone()),
            );
        };

        self.state.edit = EditDraft::from_plant(plant);
        self.edit_mut()
            .ok_or(CatalogError::from(ValidationError::NoEditInProgress))
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditingPlant> {
        match &mut self.state.edit {
            EditDraft::Editing(editing) => Some(editing),
            EditDraft::Idle => None,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.state.edit = EditDraft::Idle;
    }

    pub fn dismiss_error(&mut self) {
        self.state.last_error = None;
    }

    // endregion

    // region: record store operations

    /// Replace the catalog with the record store's plant list.
    ///
    /// A body that is not a list results in an empty catalog rather than
    /// an error, records in the list that are not plants are skipped.
    #[instrument(skip_all)]
    pub async fn load(&mut self) -> Result<(), CatalogError> {
        self.state.loading = true;
        let response = self.client.list_plants().await;
        self.state.loading = false;

        match response {
            Ok(loaded) => {
                let dropped = reconcile::replace_all(&mut self.state.plants, loaded);
                self.state.last_error = None;
                debug!(n_plants = self.state.plants.len(), dropped, "catalog loaded");
                Ok(())
            },
            Err(RecordStoreError::MalformedResponse(err)) => {
                warn!(error = %err, "malformed plant list, showing an empty catalog");
                self.state.plants.clear();
                self.state.last_error = None;
                Ok(())
            },
            Err(err) => {
                self.state.plants.clear();
                self.fail("Could not load plants", err)
            },
        }
    }

    /// Create a plant from the new-plant draft.
    ///
    /// The draft is reset on success and kept on failure.
    #[instrument(skip_all)]
    pub async fn add_plant(&mut self) -> Result<Plant, CatalogError> {
        let payload = match self.state.new_plant.validate() {
            Ok(payload) => payload,
            Err(err) => return self.fail("Could not add plant", err),
        };
        self.state.last_error = None;

        match self.client.create_plant(&payload).await {
            Ok(created) => {
                let created = reconcile::append_created(&mut self.state.plants, created).clone();
                self.state.new_plant = NewPlantDraft::default();
                debug!(id = %created.id, "plant added to catalog");
                Ok(created)
            },
            Err(err) => self.fail("Could not add plant", err),
        }
    }

    /// Send the edit draft and merge the result into the catalog.
    ///
    /// Returns `None` if the plant left the catalog while the request was
    /// in flight.
    #[instrument(skip_all)]
    pub async fn update_plant(&mut self) -> Result<Option<Plant>, CatalogError> {
        let (id, patch) = match self.state.edit.validate() {
            Ok(validated) => validated,
            Err(err) => return self.fail("Could not update plant", err),
        };
        self.state.last_error = None;

        match self.client.update_plant(&id, &patch).await {
            Ok(returned) => {
                // an empty acknowledgement confirms what was sent
                let returned = if returned == PlantPatch::default() {
                    patch
                } else {
                    returned
                };
                let updated =
                    reconcile::merge_updated(&mut self.state.plants, &id, returned).cloned();
                self.state.edit = EditDraft::Idle;
                if updated.is_none() {
                    warn!(%id, "updated plant is no longer in the catalog");
                }
                Ok(updated)
            },
            Err(err) => self.fail(&format!("Could not update plant {id}"), err),
        }
    }

    /// Delete the plant with `id` and drop it from the catalog.
    #[instrument(skip_all, fields(%id))]
    pub async fn delete_plant(&mut self, id: &PlantId) -> Result<Option<Plant>, CatalogError> {
        match self.client.delete_plant(id).await {
            Ok(()) => {
                self.state.last_error = None;
                let removed = reconcile::remove(&mut self.state.plants, id);
                if matches!(&self.state.edit, EditDraft::Editing(editing) if &editing.id == id) {
                    self.state.edit = EditDraft::Idle;
                }
                Ok(removed)
            },
            Err(err) => self.fail(&format!("Could not delete plant {id}"), err),
        }
    }

    /// Mark the plant with `id` as sold.
    #[instrument(skip_all, fields(%id))]
    pub async fn mark_sold(&mut self, id: &PlantId) -> Result<Option<Plant>, CatalogError> {
        match self.client.update_plant(id, &PlantPatch::sold()).await {
            Ok(returned) => {
                self.state.last_error = None;
                let sold = reconcile::apply_sold(&mut self.state.plants, id, returned).cloned();
                if sold.is_none() {
                    warn!(%id, "sold plant is no longer in the catalog");
                }
                Ok(sold)
            },
            Err(err) => self.fail(&format!("Could not mark plant {id} as sold"), err),
        }
    }

    // endregion

    /// Record `err` as the user-facing error and return it.
    fn fail<T>(&mut self, context: &str, err: impl Into<CatalogError>) -> Result<T, CatalogError> {
        let err = err.into();
        let message = format!("{context}: {}", display_chain(&err));
        debug!(%message, "catalog operation failed");
        self.state.last_error = Some(message);
        Err(err)
    }
}
