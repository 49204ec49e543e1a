use anyhow::Result;
use bpaf::Bpaf;
use plant_catalog::{CatalogManager, ClientTrait, PlantId};
use tracing::instrument;

use super::{catalog_result, load_catalog, print_catalog, resolve_id};
use crate::config::Config;
use crate::utils::message;

// Mark a plant as sold
#[derive(Debug, Bpaf, Clone)]
pub struct Sell {
    /// Id of the plant, as shown by 'plant-shop list'
    #[bpaf(positional("id"))]
    pub id: PlantId,
}

impl Sell {
    #[instrument(name = "sell", fields(id = %self.id), skip_all)]
    pub async fn handle<C: ClientTrait + Send>(
        self,
        _config: &Config,
        manager: &mut CatalogManager<C>,
    ) -> Result<()> {
        load_catalog(manager)?;
        let id = resolve_id(manager, &self.id);

        let result = manager.mark_sold(&id).await;
        match catalog_result(manager, result)? {
            Some(sold) => message::updated(format!("Marked '{}' as sold", sold.name)),
            None => message::warning(format!(
                "Plant {} was marked as sold but is no longer in the catalog",
                id
            )),
        }

        print_catalog(manager);
        Ok(())
    }
}
