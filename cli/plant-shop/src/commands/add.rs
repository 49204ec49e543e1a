use anyhow::Result;
use bpaf::Bpaf;
use plant_catalog::{CatalogManager, ClientTrait};
use tracing::instrument;

use super::{catalog_result, load_catalog, print_catalog};
use crate::config::Config;
use crate::utils::message;

// Add a plant to the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct Add {
    /// Name of the plant
    #[bpaf(long, short, argument("name"))]
    pub name: String,

    /// Price of the plant, e.g. 12.50
    #[bpaf(long, short, argument("price"))]
    pub price: String,

    /// URL of a picture of the plant, a placeholder is used if omitted
    #[bpaf(long, short, argument("url"))]
    pub image: Option<String>,
}

impl Add {
    #[instrument(name = "add", skip_all)]
    pub async fn handle<C: ClientTrait + Send>(
        self,
        _config: &Config,
        manager: &mut CatalogManager<C>,
    ) -> Result<()> {
        load_catalog(manager)?;

        let draft = manager.new_plant_mut();
        draft.name = self.name;
        draft.price = self.price;
        draft.image = self.image.unwrap_or_default();

        let result = manager.add_plant().await;
        let created = catalog_result(manager, result)?;

        message::created(format!(
            "Added '{}' to the catalog with id {}",
            created.name, created.id
        ));
        print_catalog(manager);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use plant_catalog::{PlantId, PLACEHOLDER_IMAGE_URL};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::tests::{manager_with, plant, starter_catalog};
    use crate::utils::message::history::History;

    #[tokio::test(flavor = "multi_thread")]
    async fn adds_plant_with_server_id() {
        let mut manager = manager_with(starter_catalog());
        manager.client().push_plant(plant(7, "Jade", 10.37, false));

        Add {
            name: "Jade".to_string(),
            price: "10.37".to_string(),
            image: None,
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap();

        let last = manager.plants().last().unwrap();
        assert_eq!(last.id, PlantId::Number(7));
        assert_eq!(last.image, PLACEHOLDER_IMAGE_URL);
        assert_eq!(History::global().messages(), [
            "✨ Added 'Jade' to the catalog with id 7"
        ]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_name_sends_nothing() {
        let mut manager = manager_with(starter_catalog());

        let err = Add {
            name: "".to_string(),
            price: "10".to_string(),
            image: None,
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Could not add plant: a plant name is required"
        );
        assert_eq!(manager.client().calls().len(), 1);
        assert_eq!(manager.plants(), starter_catalog().as_slice());
    }
}
