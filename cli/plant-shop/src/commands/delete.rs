use anyhow::Result;
use bpaf::Bpaf;
use plant_catalog::{CatalogManager, ClientTrait, PlantId};
use tracing::instrument;

use super::{catalog_result, load_catalog, print_catalog, resolve_id};
use crate::config::Config;
use crate::utils::message;

// Remove a plant from the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct Delete {
    /// Id of the plant, as shown by 'plant-shop list'
    #[bpaf(positional("id"))]
    pub id: PlantId,
}

impl Delete {
    #[instrument(name = "delete", fields(id = %self.id), skip_all)]
    pub async fn handle<C: ClientTrait + Send>(
        self,
        _config: &Config,
        manager: &mut CatalogManager<C>,
    ) -> Result<()> {
        load_catalog(manager)?;
        let id = resolve_id(manager, &self.id);

        let result = manager.delete_plant(&id).await;
        match catalog_result(manager, result)? {
            Some(removed) => message::deleted(format!("Deleted '{}'", removed.name)),
            None => message::deleted(format!("Deleted plant {id}")),
        }

        print_catalog(manager);
        Ok(())
    }
}
