use anyhow::Result;
use bpaf::Bpaf;
use itertools::Itertools;
use log::debug;
use plant_catalog::{CatalogManager, ClientTrait};
use tracing::instrument;

use super::{load_catalog, render_plants};
use crate::config::Config;
use crate::utils::message;

// Show the plants in the catalog
#[derive(Debug, Bpaf, Clone, Default)]
pub struct List {
    /// Only show plants whose name contains <term>, ignoring case
    #[bpaf(long, short, argument("term"))]
    pub search: Option<String>,

    /// Print the plants as a JSON array
    #[bpaf(long)]
    pub json: bool,
}

impl List {
    #[instrument(name = "list", fields(json = self.json, search = ?self.search), skip_all)]
    pub async fn handle<C: ClientTrait + Send>(
        self,
        config: &Config,
        manager: &mut CatalogManager<C>,
    ) -> Result<()> {
        load_catalog(manager)?;

        if let Some(search) = self.search {
            manager.set_search_term(search);
        }
        let visible = manager.visible_plants();

        if self.json {
            debug!("printing {} plants as JSON", visible.len());
            println!("{}", serde_json::to_string_pretty(&visible)?);
            return Ok(());
        }

        let limit = config.search_limit.unwrap_or(usize::MAX);
        let hidden = visible.len().saturating_sub(limit);
        print!("{}", render_plants(visible.iter().copied().take(limit)));

        if hidden > 0 {
            message::plain(format!(
                "{hidden} more {} not shown, raise 'search_limit' to see them",
                if hidden == 1 { "plant" } else { "plants" }
            ));
        }

        if !manager.search_term().is_empty() && visible.is_empty() {
            let names = manager.plants().iter().map(|p| p.name.as_str()).join(", ");
            if !names.is_empty() {
                message::plain(format!("The catalog has: {names}"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::tests::{manager_with, starter_catalog};
    use crate::utils::message::history::History;

    #[tokio::test(flavor = "multi_thread")]
    async fn search_filters_without_extra_requests() {
        let mut manager = manager_with(starter_catalog());

        List {
            search: Some("plant".to_string()),
            json: false,
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap();

        let visible = manager
            .visible_plants()
            .into_iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>();
        assert_eq!(visible, vec!["ZZ Plant".to_string()]);
        assert_eq!(manager.client().calls().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn limit_reports_hidden_plants() {
        let mut manager = manager_with(starter_catalog());
        let config = Config {
            search_limit: Some(1),
            ..Default::default()
        };

        List::default().handle(&config, &mut manager).await.unwrap();

        assert_eq!(History::global().messages(), [
            "2 more plants not shown, raise 'search_limit' to see them"
        ]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn no_match_lists_catalog_names() {
        let mut manager = manager_with(starter_catalog());

        List {
            search: Some("fern".to_string()),
            json: false,
        }
        .handle(&Config::default(), &mut manager)
        .await
        .unwrap();

        assert_eq!(History::global().messages(), [
            "The catalog has: Aloe, ZZ Plant, Pilea peperomioides"
        ]);
    }
}
