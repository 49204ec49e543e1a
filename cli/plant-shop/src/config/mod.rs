use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use log::debug;
use plant_catalog::DEFAULT_STORE_URL;
use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

/// Name of plant-shop managed directories
pub const PLANT_SHOP_DIR_NAME: &str = "plant-shop";
pub const PLANT_SHOP_CONFIG_DIR_VAR: &str = "PLANT_SHOP_CONFIG_DIR";
pub const PLANT_SHOP_CONFIG_FILE: &str = "plant-shop.toml";
const PLANT_SHOP_ENV_PREFIX: &str = "PLANT_SHOP_";

/// Describes the configuration of the storefront
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Config {
    /// Directory the user configuration file is read from (default:
    /// `$XDG_CONFIG_HOME/plant-shop`)
    #[serde(default)]
    pub config_dir: PathBuf,

    /// Base URL of the record store serving `/plants`
    pub store_url: String,

    /// Token sent as bearer authorization to the record store
    #[serde(default)]
    pub store_token: Option<String>,

    /// User agent sent to the record store
    #[serde(default)]
    pub user_agent: Option<String>,

    /// How many plants `list` shows at most
    #[serde(default)]
    pub search_limit: Option<usize>,
}

impl Config {
    /// Creates a [Config] from the environment and config files
    ///
    /// Sources in increasing precedence:
    /// built-in defaults, `/etc/plant-shop.toml`, XDG config files,
    /// `$PLANT_SHOP_CONFIG_DIR/plant-shop.toml`, `PLANT_SHOP_*` variables.
    pub fn parse() -> Result<Config> {
        let dirs = BaseDirectories::with_prefix(PLANT_SHOP_DIR_NAME);

        let config_dir = match env::var(PLANT_SHOP_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${PLANT_SHOP_CONFIG_DIR_VAR}` set: {v}");
                PathBuf::from(v)
            },
            Err(_) => {
                let config_dir = dirs
                    .get_config_home()
                    .context("Could not determine the user config directory")?;
                debug!("`${PLANT_SHOP_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };

        let xdg_config_files = dirs.find_config_files(PLANT_SHOP_CONFIG_FILE).collect();
        Self::read(
            Path::new("/etc"),
            xdg_config_files,
            &config_dir,
            env::vars(),
        )
    }

    /// Layer the given sources on top of the defaults.
    fn read(
        system_dir: &Path,
        xdg_config_files: Vec<PathBuf>,
        config_dir: &Path,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config> {
        let config_dir_str = config_dir
            .to_str()
            .context("Config directory is not valid unicode")?;

        let mut builder = HierarchicalConfig::builder()
            .set_default("store_url", DEFAULT_STORE_URL)?
            // Config dir is added to the config for completeness;
            // the config file cannot change the config dir.
            .set_override("config_dir", config_dir_str)?;

        // read from /etc
        builder = builder.add_source(
            config::File::from(system_dir.join(PLANT_SHOP_CONFIG_FILE))
                .format(config::FileFormat::Toml)
                .required(false),
        );

        // look for files in XDG_CONFIG_DIRS locations
        for file in xdg_config_files {
            builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
        }

        // Add explicit PLANT_SHOP_CONFIG_DIR file last
        builder = builder.add_source(
            config::File::from(config_dir.join(PLANT_SHOP_CONFIG_FILE))
                .format(config::FileFormat::Toml)
                .required(false),
        );

        // override via env variables
        let shop_envs = vars
            .into_iter()
            .filter(|(k, _)| k != PLANT_SHOP_CONFIG_DIR_VAR)
            .filter_map(|(k, v)| {
                k.strip_prefix(PLANT_SHOP_ENV_PREFIX)
                    .map(|k| (k.to_lowercase(), v))
            })
            .collect::<HashMap<_, _>>();

        let final_config = builder
            .add_source(
                Environment::default()
                    .source(Some(shop_envs))
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = final_config
            .try_deserialize()
            .context("Could not parse config")?;
        Ok(config)
    }
}
