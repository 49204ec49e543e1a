mod add;
mod delete;
mod edit;
mod list;
mod sell;

use std::fmt::Write;
use std::time::Duration;

use anyhow::{anyhow, Result};
use bpaf::Bpaf;
use indoc::indoc;
use plant_catalog::{CatalogError, CatalogManager, ClientTrait, Plant, PlantId};
use tracing::debug;

use crate::config::Config;
use crate::utils::dialog::{Dialog, Spinner};
use crate::utils::init::init_record_store_client;

static PLANT_SHOP_DESCRIPTION: &'_ str = indoc! {"
    Keep track of the plants in your shop.\n\n

    Plants are stored in a record store, configure its address with
    'store_url' in plant-shop.toml or the PLANT_SHOP_STORE_URL variable."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(PLANT_SHOP_DESCRIPTION))]
pub struct PlantShopCli(#[bpaf(external(plant_shop_args))] pub PlantShopArgs);

/// Main plant-shop args parser
///
/// To parse the plant-shop CLI, use [`PlantShopCli`] via [`plant_shop_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct PlantShopArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl PlantShopArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_record_store_client(&config)?;
        let mut manager = CatalogManager::new(client);

        // Given no command, list the whole catalog
        let command = self
            .command
            .unwrap_or_else(|| Commands::List(list::List::default()));
        debug!(?command, "running command");

        match command {
            Commands::List(args) => args.handle(&config, &mut manager).await,
            Commands::Add(args) => args.handle(&config, &mut manager).await,
            Commands::Edit(args) => args.handle(&config, &mut manager).await,
            Commands::Sell(args) => args.handle(&config, &mut manager).await,
            Commands::Delete(args) => args.handle(&config, &mut manager).await,
        }
    }
}

#[derive(Bpaf, Clone, Debug)]
enum Commands {
    /// Show the plants in the catalog
    #[bpaf(command, long("ls"))]
    List(#[bpaf(external(list::list))] list::List),

    /// Add a plant to the catalog
    #[bpaf(command)]
    Add(#[bpaf(external(add::add))] add::Add),

    /// Change the name or price of a plant
    #[bpaf(command)]
    Edit(#[bpaf(external(edit::edit))] edit::Edit),

    /// Mark a plant as sold
    #[bpaf(command)]
    Sell(#[bpaf(external(sell::sell))] sell::Sell),

    /// Remove a plant from the catalog
    #[bpaf(command, long("rm"))]
    Delete(#[bpaf(external(delete::delete))] delete::Delete),
}

/// Load the catalog, showing a spinner while the record store is slow to answer.
///
/// Only the initial load shows progress, mutations run without.
pub(crate) fn load_catalog<C>(manager: &mut CatalogManager<C>) -> Result<()>
where
    C: ClientTrait + Send,
{
    let result = Dialog {
        message: "Loading plants...",
        help_message: None,
        typed: Spinner::new(|| tokio::runtime::Handle::current().block_on(manager.load())),
    }
    .spin_with_delay(Duration::from_millis(200));

    catalog_result(manager, result)
}

/// Find the catalog id that `id` was typed from.
///
/// Ids on the command line read as numbers when they are all digits,
/// but a record store may hand out digit-only text ids. Those print the
/// same, so match on the printed form once an exact match fails.
pub(crate) fn resolve_id<C: ClientTrait>(manager: &CatalogManager<C>, id: &PlantId) -> PlantId {
    let plants = manager.plants();
    let shown = id.to_string();

    plants
        .iter()
        .find(|plant| &plant.id == id)
        .or_else(|| plants.iter().find(|plant| plant.id.to_string() == shown))
        .map(|plant| plant.id.clone())
        .unwrap_or_else(|| id.clone())
}

/// Replace a failed operation's error with the message the manager recorded for it.
pub(crate) fn catalog_result<C: ClientTrait, T>(
    manager: &CatalogManager<C>,
    result: Result<T, CatalogError>,
) -> Result<T> {
    result.map_err(|err| match manager.last_error() {
        Some(message) => anyhow!(message.to_string()),
        None => anyhow::Error::new(err),
    })
}

/// Render plants one per line, unsold plants show how to sell them.
pub(crate) fn render_plants<'a>(plants: impl IntoIterator<Item = &'a Plant>) -> String {
    let mut out = String::new();
    for plant in plants {
        let _ = write!(out, "{}  {}  ${:.2}  ", plant.id, plant.name, plant.price);
        if plant.sold {
            let _ = writeln!(out, "[sold]");
        } else {
            let _ = writeln!(out, "Mark as Sold: 'plant-shop sell {}'", plant.id);
        }
    }

    if out.is_empty() {
        out.push_str("No plants found.\n");
    }
    out
}

/// Print the catalog after a change.
pub(crate) fn print_catalog<C: ClientTrait>(manager: &CatalogManager<C>) {
    print!("{}", render_plants(manager.plants()));
}

#[cfg(test)]
mod tests {
    use bpaf::Args;
    use plant_catalog::{MockClient, PlantId, PLACEHOLDER_IMAGE_URL};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::message::history::History;

    pub(super) fn plant(id: u64, name: &str, price: f64, sold: bool) -> Plant {
        Plant {
            id: PlantId::Number(id),
            name: name.to_string(),
            price,
            image: PLACEHOLDER_IMAGE_URL.to_string(),
            sold,
        }
    }

    pub(super) fn starter_catalog() -> Vec<Plant> {
        vec![
            plant(1, "Aloe", 15.99, false),
            plant(2, "ZZ Plant", 25.98, true),
            plant(3, "Pilea peperomioides", 5.0, false),
        ]
    }

    /// A manager over a mock client that will answer the initial load with `plants`.
    pub(super) fn manager_with(plants: Vec<Plant>) -> CatalogManager<MockClient> {
        History::global().clear();
        let client = MockClient::default();
        client.push_plants(plants);
        CatalogManager::new(client)
    }

    #[test]
    fn renders_sold_and_unsold_plants() {
        let rendered = render_plants(&starter_catalog());

        assert_eq!(rendered, indoc! {"
            1  Aloe  $15.99  Mark as Sold: 'plant-shop sell 1'
            2  ZZ Plant  $25.98  [sold]
            3  Pilea peperomioides  $5.00  Mark as Sold: 'plant-shop sell 3'
        "});
    }

    #[test]
    fn renders_empty_catalog() {
        assert_eq!(render_plants(std::iter::empty()), "No plants found.\n");
    }

    #[test]
    fn renders_text_ids_without_quotes() {
        let plant = Plant {
            id: PlantId::Text("a1b2".to_string()),
            ..plant(0, "Jade", 10.37, true)
        };

        assert_eq!(render_plants([&plant]), "a1b2  Jade  $10.37  [sold]\n");
    }

    #[tokio::test]
    async fn typed_id_resolves_to_digit_only_text_id() {
        let jade = Plant {
            id: PlantId::Text("4821".to_string()),
            ..plant(0, "Jade", 10.37, false)
        };
        let mut manager = manager_with(vec![plant(1, "Aloe", 15.99, false), jade]);
        manager.load().await.unwrap();

        assert_eq!(
            resolve_id(&manager, &PlantId::from("4821")),
            PlantId::Text("4821".to_string())
        );
        assert_eq!(resolve_id(&manager, &PlantId::from("1")), PlantId::Number(1));
        assert_eq!(resolve_id(&manager, &PlantId::from("7")), PlantId::Number(7));
    }

    #[test]
    fn parses_verbosity_and_command() {
        let PlantShopCli(args) = plant_shop_cli()
            .run_inner(Args::from(&["-vv", "sell", "4"]))
            .unwrap();

        assert_eq!(args.verbosity, Verbosity::Verbose(2));
        assert!(matches!(
            args.command,
            Some(Commands::Sell(sell::Sell { id: PlantId::Number(4) }))
        ));
    }

    #[test]
    fn no_command_is_accepted() {
        let PlantShopCli(args) = plant_shop_cli().run_inner(Args::from(&["-q"])).unwrap();

        assert_eq!(args.verbosity, Verbosity::Quiet);
        assert!(args.command.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_load_reports_recorded_message() {
        let client = MockClient::default();
        client.push_error(503, None);
        let mut manager = CatalogManager::new(client);

        let err = load_catalog(&mut manager).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Could not load plants: record store responded with 503 Service Unavailable"
        );
    }
}
