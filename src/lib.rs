use std::sync::Arc;

use api::ApiClient;
use catalog::{Catalog, RegionTable};
use config::Config;
use error::AppResult;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;
pub mod infrastructure;
pub mod jobs;
pub mod result;
pub mod search;
pub mod session;
pub mod shell;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: ApiClient,
    pub catalog: Arc<Catalog>,
    pub regions: Arc<RegionTable>,
}

impl AppState {
    /// Builds the HTTP client and loads reference data, preferring the
    /// override files named in the configuration over the bundled copies.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let client = ApiClient::new(&config)?;
        let catalog = match &config.categories_file {
            Some(path) => Catalog::load(path)?,
            None => Catalog::bundled()?,
        };
        let regions = match &config.regions_file {
            Some(path) => RegionTable::load(path)?,
            None => RegionTable::bundled()?,
        };
        tracing::debug!(
            "Loaded {} root categories and {} regions",
            catalog.roots().len(),
            regions.len()
        );

        Ok(AppState {
            config: Arc::new(config),
            client,
            catalog: Arc::new(catalog),
            regions: Arc::new(regions),
        })
    }
}
