use anyhow::{bail, Result};
use bpaf::Bpaf;
use plant_catalog::{CatalogManager, ClientTrait, PlantId};
use tracing::instrument;

use super::{catalog_result, load_catalog, print_catalog, resolve_id};
use crate::config::Config;
use crate::utils::message;

// Change the name or price of a plant
#[derive(Debug, Bpaf, Clone)]
pub struct Edit {
    /// New name of the plant
    #[bpaf(long, short, argument("name"))]
    pub name: Option<String>,

    /// New price of the plant
    #[bpaf(long, short, argument("price"))]
    pub price: Option<String>,

    /// Id of the plant, as shown by 'plant-shop list'
    #[bpaf(positional("id"))]
    pub id: PlantId,
}

impl Edit {
    #[instrument(name = "edit", fields(id = %self.id), skip_all)]
    pub async fn handle<C: ClientTrait + Send>(
        self,
        _config: &Config,
        manager: &mut CatalogManager<C>,
    ) -> Result<()> {
        if self.name.is_none() && self.price.is_none() {
            bail!("Nothing to change, pass '--name' or '--price'");
        }

        load_catalog(manager)?;
        let id = resolve_id(manager, &self.id);

        let result = manager.begin_edit(&id).map(|editing| {
            if let Some(name) = self.name {
                editing.name = name;
            }
            if let Some(price) = self.price {
                editing.price = price;
            }
        });
        catalog_result(manager, result)?;

        let result = manager.update_plant().await;
        match catalog_result(manager, result)? {
            Some(updated) => message::updated(format!(
                "Updated '{}', now ${:.2}",
                updated.name, updated.price
            )),
            None => message::warning(format!(
                "Plant {} was updated but is no longer in the catalog",
                id
            )),
        }

        print_catalog(manager);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use plant_catalog::PlantPatch;
    use pretty_assertions::assert_eq;

    use plant_catalog::Plant;

    use super::*;
    use crate::commands::tests::{manager_with, plant, starter_catalog};
    use crate::utils::message::history::History;

    #[tokio::test(flavor = "multi_thread")]
    async fn keeps_fields_not_returned() {
        let mut manager = manager_with(starter_catalog());
        manager.client().push_patch(PlantPatch {
            price: Some(17.5),
            ..Default::default()
        });

        Edit {
            name: None,
            price: Some("17.50".to_string()),
            id: PlantId::Number(1),
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap();

        let aloe = &manager.plants()[0];
        assert_eq!(aloe.name, "Aloe");
        assert_eq!(aloe.price, 17.5);
        assert!(manager.state().edit().is_idle());
        assert_eq!(History::global().messages(), ["✅ Updated 'Aloe', now $17.50"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn edits_plant_with_digit_only_text_id() {
        let jade = Plant {
            id: PlantId::Text("4821".to_string()),
            ..plant(0, "Jade", 10.37, false)
        };
        let mut manager = manager_with(vec![jade]);
        manager.client().push_ack();

        Edit {
            name: Some("Jade Tree".to_string()),
            price: None,
            id: PlantId::from("4821"),
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap();

        assert_eq!(manager.plants()[0].name, "Jade Tree");
        assert_eq!(manager.plants()[0].id, PlantId::Text("4821".to_string()));
        assert_eq!(History::global().messages(), [
            "✅ Updated 'Jade Tree', now $10.37"
        ]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_plant_is_an_error() {
        let mut manager = manager_with(starter_catalog());

        let err = Edit {
            name: Some("Fern".to_string()),
            price: None,
            id: PlantId::Text("fern".to_string()),
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Could not edit plant: no plant with id fern in the catalog"
        );
        assert_eq!(manager.client().calls().len(), 1);
    }

    #[tokio::test]
    async fn requires_a_change() {
        let mut manager = manager_with(starter_catalog());

        let result = Edit {
            name: None,
            price: None,
            id: PlantId::Number(1),
        }
        .handle(&Config::default(), &mut manager)
        .await;

        assert!(result.is_err());
        assert!(manager.client().calls().is_empty());
    }
}
